//! The serverless-style function endpoints.
//!
//! `POST /functions/v1/execute-tool` dispatches a named tool through
//! the registry; `POST /functions/v1/multi-agent-chat` forwards its
//! body verbatim to the configured orchestrator upstream and returns
//! the upstream response unchanged. Both answer `OPTIONS` with an
//! empty 200 (CORS preflight) and any other non-POST method with 405.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use cf_domain::tool::ToolError;
use cf_tools::ExecutionRequest;

use crate::state::AppState;

/// Empty 200 for CORS preflight. Unmatched methods on these routes get
/// axum's 405 without any handler involvement.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /functions/v1/execute-tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Correlates the call with an agent run; a fresh id is generated
    /// when absent.
    #[serde(default)]
    pub trace_id: Option<String>,
}

fn tool_error_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::InvalidParameters(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
        ToolError::Store(_) | ToolError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

pub async fn execute_tool(
    State(state): State<AppState>,
    Json(body): Json<ExecuteToolRequest>,
) -> Response {
    let run_id = body
        .trace_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let request = ExecutionRequest {
        tool_name: body.tool_name.clone(),
        parameters: body.parameters,
        user_id: body.user_id,
        run_id,
    };

    match state.executor.execute(request).await {
        Ok(output) => Json(serde_json::json!({
            "success": true,
            "message": output.content,
            "data": {
                "content": output.content,
                "metadata": output.metadata,
            },
        }))
        .into_response(),
        Err(err) => (
            tool_error_status(&err),
            Json(serde_json::json!({
                "success": false,
                "message": err.to_string(),
                "error": error_kind(&err),
            })),
        )
            .into_response(),
    }
}

fn error_kind(err: &ToolError) -> &'static str {
    match err {
        ToolError::InvalidParameters(_) => "invalid_parameters",
        ToolError::UnknownTool(_) => "unknown_tool",
        ToolError::InsufficientCredits { .. } => "insufficient_credits",
        ToolError::Store(_) => "store",
        ToolError::Upstream(_) => "upstream",
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /functions/v1/multi-agent-chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Raw passthrough proxy. The request body is forwarded unchanged to
/// the orchestrator upstream and the upstream response is returned
/// unchanged — the gateway interprets neither side.
pub async fn multi_agent_chat(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let Some(orchestrator) = &state.orchestrator else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "no orchestrator upstream configured"
            })),
        )
            .into_response();
    };

    match orchestrator.invoke("multi-agent-chat", &payload).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_camel_case_fields() {
        let req: ExecuteToolRequest = serde_json::from_value(serde_json::json!({
            "toolName": "product_shot",
            "parameters": {"product_description": "red shoe"},
            "userId": "u1",
            "traceId": "run-9",
        }))
        .unwrap();
        assert_eq!(req.tool_name, "product_shot");
        assert_eq!(req.user_id.as_deref(), Some("u1"));
        assert_eq!(req.trace_id.as_deref(), Some("run-9"));
    }

    #[test]
    fn error_statuses_map_by_kind() {
        assert_eq!(
            tool_error_status(&ToolError::UnknownTool("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            tool_error_status(&ToolError::InvalidParameters("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            tool_error_status(&ToolError::InsufficientCredits {
                required: 2,
                available: 0
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            tool_error_status(&ToolError::Store("down".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
