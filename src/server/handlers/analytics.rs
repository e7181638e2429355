//! Analysis endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::AppState;
use super::types::{error_json, invalid_file_id, AnalysisResponse};
use crate::models::FileId;

/// Run (or return the cached) analysis for a file.
pub async fn analyze_file(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let file_id: FileId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => return invalid_file_id(&raw_id, &e),
    };

    match state.orchestrator.analyze(file_id).await {
        Ok(record) => Json(AnalysisResponse::from(&record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch a stored analysis without triggering one.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let file_id: FileId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => return invalid_file_id(&raw_id, &e),
    };

    match state.orchestrator.get_analysis(file_id).await {
        Ok(Some(record)) => Json(AnalysisResponse::from(&record)).into_response(),
        Ok(None) => error_json(
            StatusCode::NOT_FOUND,
            format!("no analysis for file {}", file_id),
        ),
        Err(e) => e.into_response(),
    }
}
