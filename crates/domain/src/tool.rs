//! Tool descriptors and the execution contract.
//!
//! A [`ToolDefinition`] is the static capability descriptor registered
//! once at startup; execution produces a [`ToolOutput`] or a
//! [`ToolError`]. The error contract is explicit — invalid arguments
//! fail at the dispatch boundary, before any side effect.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Definition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Static tool descriptor. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique within the registry.
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters
    /// (`{"type": "object", "properties": {...}, "required": [...]}`).
    pub parameters: serde_json::Value,
    /// Credits charged per successful execution.
    #[serde(default)]
    pub required_credits: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Output
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Successful tool execution result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    pub metadata: ToolMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Fresh per execution — never reused across calls.
    pub request_id: Uuid,
    /// Backend job spawned by the tool, when one exists. Callers hand
    /// this to the media poller for reconciliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Tool-specific extras (style, dimensions, ...), flattened.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ToolMetadata {
    /// Metadata with a fresh request id and no extras.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            job_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for ToolMetadata {
    fn default() -> Self {
        Self::new()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tool execution failure.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: u32, available: u32 },

    #[error("store: {0}")]
    Store(String),

    #[error("upstream: {0}")]
    Upstream(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_request_ids_are_distinct() {
        assert_ne!(ToolMetadata::new().request_id, ToolMetadata::new().request_id);
    }

    #[test]
    fn metadata_extras_flatten() {
        let meta = ToolMetadata::new()
            .with_job_id("job-7")
            .with_extra("aspect_ratio", serde_json::json!("16:9"));
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["job_id"], "job-7");
        assert_eq!(json["aspect_ratio"], "16:9");
        // Flattened, not nested under "extra".
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn definition_defaults_to_zero_credits() {
        let def: ToolDefinition = serde_json::from_value(serde_json::json!({
            "name": "noop",
            "description": "does nothing",
            "parameters": {"type": "object", "properties": {}},
        }))
        .unwrap();
        assert_eq!(def.required_credits, 0);
    }

    #[test]
    fn error_display_is_descriptive() {
        let err = ToolError::InsufficientCredits { required: 2, available: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient credits: 2 required, 1 available"
        );
    }
}
