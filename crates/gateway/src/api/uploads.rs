//! File uploads into the storage buckets.
//!
//! The body is the raw file content; the filename rides in the query
//! and keeps its extension in the generated object key. Both
//! operations propagate the underlying store error as a 502.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    /// Defaults to the configured default bucket.
    #[serde(default)]
    pub bucket: Option<String>,
}

/// `POST /v1/uploads?filename=shot.png[&bucket=media]`
pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "empty upload body" })),
        )
            .into_response();
    }

    let bucket = query
        .bucket
        .unwrap_or_else(|| state.config.storage.default_bucket.clone());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match state
        .buckets
        .upload_file(&bucket, &query.filename, body.to_vec(), content_type)
        .await
    {
        Ok(url) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "url": url, "bucket": bucket })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

/// `DELETE /v1/uploads/:bucket/*key`
pub async fn delete_file(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    match state.buckets.delete_file(&bucket, &key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(e),
    }
}

fn store_error(e: cf_domain::error::Error) -> Response {
    tracing::warn!(error = %e, "bucket operation failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}
