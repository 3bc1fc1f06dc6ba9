//! Browser automation tool.
//!
//! Creates a pending browser-automation task row in the backing store
//! and returns its id. The automation workers pick the row up from
//! there; progress flows back through the usual status polling.

use async_trait::async_trait;
use serde_json::Value;

use cf_domain::tool::{ToolDefinition, ToolError, ToolMetadata, ToolOutput};
use cf_store::tables::NewBrowserTask;

use crate::params::BrowserTaskParams;
use crate::registry::{RunContext, Tool};

pub struct BrowserUseTool {
    def: ToolDefinition,
}

impl BrowserUseTool {
    pub fn new() -> Self {
        Self {
            def: ToolDefinition {
                name: "browser_use".into(),
                description: "Run a natural-language task in an automated browser session".into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "task": {
                            "type": "string",
                            "description": "Instruction for the browser agent"
                        },
                        "environment": {
                            "type": "string",
                            "description": "Execution environment (defaults to \"browser\")"
                        },
                        "save_session_data": {
                            "type": "boolean"
                        }
                    },
                    "required": ["task"]
                }),
                required_credits: 1,
            },
        }
    }
}

impl Default for BrowserUseTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for BrowserUseTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, args: &Value, ctx: &RunContext) -> Result<ToolOutput, ToolError> {
        let params = BrowserTaskParams::from_args(args)?;

        let store = ctx
            .store
            .as_ref()
            .ok_or_else(|| ToolError::Store("backing store not configured".into()))?;
        let user_id = ctx
            .user_id
            .as_deref()
            .ok_or_else(|| ToolError::InvalidParameters("user_id is required".into()))?;

        let row = store
            .insert_browser_task(&NewBrowserTask {
                input: params.task.clone(),
                user_id: user_id.to_owned(),
                status: "pending".into(),
                environment: params.environment.clone(),
            })
            .await
            .map_err(|e| ToolError::Store(e.to_string()))?;

        tracing::info!(run_id = %ctx.run_id, task_id = %row.id, "browser task created");

        let mut metadata = ToolMetadata::new().with_job_id(row.id.to_string());
        if let Some(live_url) = row.live_url {
            metadata = metadata.with_extra("live_url", Value::String(live_url));
        }

        Ok(ToolOutput {
            content: format!("Browser task started. Task ID: {}", row.id),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_store_is_a_store_error() {
        let tool = BrowserUseTool::new();
        let err = tool
            .execute(
                &json!({"task": "open dashboard"}),
                &RunContext::new("run-1").with_user("u1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Store(_)));
    }

    #[tokio::test]
    async fn invalid_params_beat_missing_store() {
        // Parameter validation happens first, before any side effect.
        let tool = BrowserUseTool::new();
        let err = tool
            .execute(&json!({}), &RunContext::new("run-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }
}
