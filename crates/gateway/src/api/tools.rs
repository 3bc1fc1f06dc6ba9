//! Tool listings and external tool-server calls.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use cf_mcp_client::McpError;

use crate::state::AppState;

/// `GET /v1/tools` — built-in registry descriptors plus everything the
/// connected tool servers advertise.
pub async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    let external: Vec<serde_json::Value> = state
        .mcp
        .list_tools()
        .into_iter()
        .map(|(server, def)| {
            let def = def.to_definition();
            serde_json::json!({
                "server": server,
                "name": def.name,
                "description": def.description,
                "parameters": def.parameters,
            })
        })
        .collect();

    Json(serde_json::json!({
        "tools": state.executor.registry().definitions(),
        "external": external,
    }))
}

#[derive(Debug, Deserialize)]
pub struct McpCallRequest {
    pub server: String,
    pub tool: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// `POST /v1/mcp/call`
pub async fn call_mcp_tool(
    State(state): State<AppState>,
    Json(body): Json<McpCallRequest>,
) -> Response {
    match state
        .mcp
        .call_tool(&body.server, &body.tool, body.arguments)
        .await
    {
        Ok(content) => Json(serde_json::json!({ "content": content })).into_response(),
        Err(err) => {
            let status = match &err {
                McpError::UnknownServer(_) | McpError::UnknownTool { .. } => {
                    StatusCode::NOT_FOUND
                }
                McpError::Transport(_) | McpError::Protocol(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
