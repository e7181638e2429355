//! Error types reported by collaborators.

use thiserror::Error;

use crate::models::FileId;

/// Failure of a remote collaborator (file storage, renderer, object store).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("{0}")]
    Unavailable(String),
}

/// Failure of the analysis record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("analysis record for file {0} already exists")]
    UniqueViolation(FileId),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("stored record is invalid: {0}")]
    Corrupt(String),
}

impl RecordStoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RecordStoreError::UniqueViolation(_))
    }
}
