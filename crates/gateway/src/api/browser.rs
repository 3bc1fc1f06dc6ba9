//! Browser-automation task endpoints.
//!
//! Creation normally happens through the `browser_use` tool; this
//! surface exists for the automation workers (status writes) and the
//! UI (status polls).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBrowserTaskRequest {
    pub task: String,
    pub user_id: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "browser".into()
}

/// `POST /v1/browser-tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateBrowserTaskRequest>,
) -> Response {
    match state
        .browser_tasks
        .create(body.task, body.user_id, body.environment)
        .await
    {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => store_error(e),
    }
}

/// `GET /v1/browser-tasks/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Response {
    match state.browser_tasks.check_status(task_id).await {
        Ok(Some(status)) => Json(status).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "browser task not found" })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBrowserTaskRequest {
    pub status: String,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

/// `POST /v1/browser-tasks/:id/status` — worker callback.
pub async fn update_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(body): Json<UpdateBrowserTaskRequest>,
) -> Response {
    match state
        .browser_tasks
        .update_status(task_id, &body.status, body.output.as_ref())
        .await
    {
        Ok(()) => Json(serde_json::json!({
            "task_id": task_id,
            "status": body.status,
        }))
        .into_response(),
        Err(e) => store_error(e),
    }
}

fn store_error(e: cf_domain::error::Error) -> Response {
    tracing::warn!(error = %e, "browser task store call failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}
