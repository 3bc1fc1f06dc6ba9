//! Media-job endpoints over the poller's snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use cf_jobs::JobKey;
use cf_store::tables::JobKind;

use crate::state::AppState;

/// `GET /v1/jobs` — the current job-id → last-known-status mapping.
pub async fn snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.poller.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct TrackJobRequest {
    pub kind: JobKind,
    pub id: String,
}

/// `POST /v1/jobs/track` — start reconciling a job created elsewhere
/// (the generation workers write rows; the gateway only polls them).
pub async fn track(
    State(state): State<AppState>,
    Json(body): Json<TrackJobRequest>,
) -> impl IntoResponse {
    state.poller.track(JobKey::new(body.kind, body.id.clone()));
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "id": body.id,
            "tracked": state.poller.tracked_count(),
        })),
    )
}

/// `GET /v1/jobs/:id`
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    match state.poller.snapshot().get(&job_id) {
        Some(status) => Json(status).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "job not tracked" })),
        )
            .into_response(),
    }
}
