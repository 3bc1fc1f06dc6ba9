//! Auth-session endpoints over the process-wide [`SessionProvider`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use cf_store::AuthSession;

use crate::state::AppState;

/// `GET /v1/session`
pub async fn get_session(State(state): State<AppState>) -> Response {
    match state.session.current() {
        Some(session) => Json(serde_json::json!({
            "signed_in": true,
            "session": session,
        }))
        .into_response(),
        None => Json(serde_json::json!({ "signed_in": false })).into_response(),
    }
}

/// `POST /v1/session` — install a session; subscribers are notified.
pub async fn set_session(
    State(state): State<AppState>,
    Json(session): Json<AuthSession>,
) -> StatusCode {
    state.session.set_session(session);
    StatusCode::NO_CONTENT
}

/// `DELETE /v1/session`
pub async fn clear_session(State(state): State<AppState>) -> StatusCode {
    state.session.clear();
    StatusCode::NO_CONTENT
}
