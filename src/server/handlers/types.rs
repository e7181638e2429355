//! Response bodies and error mapping for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::models::{AnalysisRecord, InvalidFileId};

/// Analysis record as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub file_id: String,
    pub image_location: String,
    pub image_url: String,
    pub created_at_utc: String,
    pub paragraph_count: u64,
    pub word_count: u64,
    pub character_count: u64,
}

impl From<&AnalysisRecord> for AnalysisResponse {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            file_id: record.file_id().to_string(),
            image_location: record.image_location().to_string(),
            image_url: format!("/api/images/{}", record.image_location()),
            created_at_utc: crate::repository::models::format_timestamp(
                &record.created_at_utc(),
            ),
            paragraph_count: record.paragraph_count(),
            word_count: record.word_count(),
            character_count: record.character_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'static str>,
}

pub fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
            stage: None,
        }),
    )
        .into_response()
}

pub fn invalid_file_id(raw: &str, err: &InvalidFileId) -> Response {
    error_json(
        StatusCode::BAD_REQUEST,
        format!("invalid file id '{}': {}", raw, err),
    )
}

/// HTTP status for a failed analysis.
pub fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        _ if err.is_client_fault() => StatusCode::BAD_REQUEST,
        _ if err.is_race_lost() => StatusCode::CONFLICT,
        AnalysisError::UpstreamFetch { .. }
        | AnalysisError::Render { .. }
        | AnalysisError::Storage { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        (
            status_for(&self),
            Json(ErrorBody {
                error: self.to_string(),
                stage: Some(self.stage().as_str()),
            }),
        )
            .into_response()
    }
}
