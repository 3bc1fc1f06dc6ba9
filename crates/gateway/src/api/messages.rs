//! Conversation endpoints — the HTTP face of the message pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use cf_domain::message::LocalMessage;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    #[serde(flatten)]
    pub message: LocalMessage,
    /// Overrides the signed-in session's user for this turn.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `POST /v1/conversations/:id/messages` — normalize a draft, append
/// it, and run any requested tool. Returns the final message.
pub async fn submit_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<SubmitMessageRequest>,
) -> Response {
    if body.message.role.is_none() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "message role is required" })),
        )
            .into_response();
    }

    let message = state
        .pipeline
        .submit(&conversation_id, body.message, body.user_id)
        .await;

    (StatusCode::CREATED, Json(message)).into_response()
}

/// `GET /v1/conversations/:id/messages`
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    Json(state.conversations.messages(&conversation_id))
}

/// `DELETE /v1/conversations/:id`
pub async fn clear_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> StatusCode {
    state.conversations.clear(&conversation_id);
    StatusCode::NO_CONTENT
}
