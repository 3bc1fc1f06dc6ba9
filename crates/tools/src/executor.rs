//! Tool dispatch.
//!
//! One path for every invocation: look the tool up, check credits,
//! execute, record usage. Credit enforcement happens before the tool
//! runs; usage tracking happens after and never fails the call.

use std::sync::Arc;

use chrono::Utc;

use cf_domain::config::ToolsConfig;
use cf_domain::tool::{ToolError, ToolOutput};
use cf_domain::trace::TraceEvent;
use cf_store::tables::ToolUsageRow;
use cf_store::StoreClient;

use crate::registry::{RunContext, ToolRegistry};

/// One tool invocation as the gateway receives it.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub user_id: Option<String>,
    pub run_id: String,
}

/// Dispatches invocations through the registry.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    store: Option<Arc<StoreClient>>,
    config: ToolsConfig,
}

impl ToolExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        store: Option<Arc<StoreClient>>,
        config: ToolsConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, req: ExecutionRequest) -> Result<ToolOutput, ToolError> {
        let tool = self
            .registry
            .get(&req.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(req.tool_name.clone()))?;

        let required = tool.definition().required_credits;
        if required > 0 && self.config.enforce_credits {
            self.check_credits(&req, required).await?;
        }

        let mut ctx = RunContext::new(req.run_id.clone());
        ctx.user_id = req.user_id.clone();
        ctx.store = self.store.clone();

        let result = tool.execute(&req.parameters, &ctx).await;

        let request_id = result
            .as_ref()
            .map(|out| out.metadata.request_id.to_string())
            .unwrap_or_default();
        TraceEvent::ToolExecuted {
            tool: req.tool_name.clone(),
            user_id: req.user_id.clone().unwrap_or_default(),
            request_id,
            credits_charged: if result.is_ok() { required } else { 0 },
            success: result.is_ok(),
        }
        .emit();

        if result.is_ok() && self.config.track_usage {
            self.track_usage(&req, required).await;
        }

        result
    }

    /// Abort before execution when the user cannot cover the tool.
    async fn check_credits(&self, req: &ExecutionRequest, required: u32) -> Result<(), ToolError> {
        let (Some(store), Some(user_id)) = (self.store.as_ref(), req.user_id.as_deref()) else {
            // No store or anonymous caller — nothing to check against.
            return Ok(());
        };

        let row = store
            .get_user_credits(user_id)
            .await
            .map_err(|e| ToolError::Store(e.to_string()))?;

        let available = row.map(|r| r.credits_remaining).unwrap_or(0);
        if available < required {
            return Err(ToolError::InsufficientCredits {
                required,
                available,
            });
        }
        Ok(())
    }

    /// Record a usage row. Failures are logged and swallowed — usage
    /// accounting must not fail an already-successful execution.
    async fn track_usage(&self, req: &ExecutionRequest, credits: u32) {
        let (Some(store), Some(user_id)) = (self.store.as_ref(), req.user_id.as_deref()) else {
            return;
        };
        let row = ToolUsageRow {
            user_id: user_id.to_owned(),
            tool_name: req.tool_name.clone(),
            credits_used: credits,
            used_at: Utc::now(),
        };
        if let Err(e) = store.record_tool_usage(&row).await {
            tracing::warn!(tool = %req.tool_name, error = %e, "failed to record tool usage");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
