//! Catalog reads — the small static collections the creation UI
//! populates its pickers from.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::state::AppState;

/// `GET /v1/catalog/story-types`
pub async fn story_types(State(state): State<AppState>) -> Response {
    match state.store.list_story_types().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => store_error(e),
    }
}

/// `GET /v1/catalog/voice-options`
pub async fn voice_options(State(state): State<AppState>) -> Response {
    match state.store.list_voice_options().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => store_error(e),
    }
}

fn store_error(e: cf_domain::error::Error) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}
