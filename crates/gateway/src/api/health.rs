//! Health probe.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.executor.registry().len(),
        "tool_servers": state.mcp.server_count(),
        "tracked_jobs": state.poller.tracked_count(),
        "conversations": state.conversations.conversation_count(),
    }))
}
