//! Rendered image download.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::super::AppState;
use super::types::error_json;
use crate::services::UpstreamError;
use crate::storage::IMAGE_CONTENT_TYPE;

/// Serve a stored word cloud by object key.
pub async fn serve_image(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.artifacts.read(&state.bucket, &key).await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)], bytes).into_response(),
        Ok(None) | Err(UpstreamError::InvalidKey(_)) => {
            error_json(StatusCode::NOT_FOUND, "Image not found")
        }
        Err(e) => {
            tracing::warn!("Failed to read image {}: {}", key, e);
            error_json(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
