//! Tool trait and registry.
//!
//! The registry is populated during bootstrap and then shared behind
//! an `Arc` — registration after startup is not a thing, which is what
//! makes lock-free reads safe.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cf_domain::error::{Error, Result};
use cf_domain::tool::{ToolDefinition, ToolError, ToolOutput};
use cf_store::StoreClient;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Context handed to every tool execution.
#[derive(Clone)]
pub struct RunContext {
    /// Correlates all work done on behalf of one agent run.
    pub run_id: String,
    pub user_id: Option<String>,
    /// Backing store, when the deployment has one wired up. Tools that
    /// need it fail with `ToolError::Store` when it is absent.
    pub store: Option<Arc<StoreClient>>,
}

impl RunContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            user_id: None,
            store: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_store(mut self, store: Arc<StoreClient>) -> Self {
        self.store = Some(store);
        self
    }
}

/// A named, schema-described capability.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Execute with raw arguments. Implementations parse their typed
    /// parameter record first and fail with `InvalidParameters` before
    /// any side effect.
    async fn execute(&self, args: &Value, ctx: &RunContext) -> std::result::Result<ToolOutput, ToolError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide tool registry. Built once, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique — a duplicate is a bootstrap
    /// bug and fails loudly.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            return Err(Error::Config(format!("duplicate tool registration: {name}")));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All descriptors, sorted by name for stable listings.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| t.definition().clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::tool::ToolMetadata;

    struct EchoTool {
        def: ToolDefinition,
    }

    impl EchoTool {
        fn named(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                def: ToolDefinition {
                    name: name.into(),
                    description: "echoes its input".into(),
                    parameters: serde_json::json!({"type": "object", "properties": {}}),
                    required_credits: 0,
                },
            })
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(
            &self,
            args: &Value,
            _ctx: &RunContext,
        ) -> std::result::Result<ToolOutput, ToolError> {
            Ok(ToolOutput {
                content: args.to_string(),
                metadata: ToolMetadata::new(),
            })
        }
    }

    #[test]
    fn register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("echo")).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("echo")).unwrap();
        let err = registry.register(EchoTool::named("echo")).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn definitions_are_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("zeta")).unwrap();
        registry.register(EchoTool::named("alpha")).unwrap();
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
