//! Credit balance reads.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::state::AppState;

/// `GET /v1/credits/:user_id`
pub async fn get_credits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.store.get_user_credits(&user_id).await {
        Ok(Some(row)) => Json(row).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no credit record for user" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
