//! Classified pipeline failures.

use std::fmt;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::models::FileId;
use crate::services::{RecordStoreError, UpstreamError};

/// Pipeline step at which an analysis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lookup,
    Fetch,
    Validate,
    Decode,
    Render,
    Store,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lookup => "lookup",
            Stage::Fetch => "fetch",
            Stage::Validate => "validate",
            Stage::Decode => "decode",
            Stage::Render => "render",
            Stage::Store => "store",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an analysis request failed.
///
/// None of these are retried by the pipeline. `UnsupportedFormat` and
/// `Decode` are caller faults; the rest are dependency faults.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to look up analysis for file {file_id}: {source}")]
    Lookup {
        file_id: FileId,
        #[source]
        source: RecordStoreError,
    },

    #[error("failed to fetch source file {file_id}: {source}")]
    UpstreamFetch {
        file_id: FileId,
        #[source]
        source: UpstreamError,
    },

    #[error("file {file_id} ('{file_name}') is not a .txt file; only plain text can be analyzed")]
    UnsupportedFormat { file_id: FileId, file_name: String },

    #[error("file {file_id} is not valid UTF-8: {source}")]
    Decode {
        file_id: FileId,
        #[source]
        source: FromUtf8Error,
    },

    #[error("failed to render word cloud for file {file_id}: {source}")]
    Render {
        file_id: FileId,
        #[source]
        source: UpstreamError,
    },

    #[error("failed to store image '{key}' for file {file_id}: {source}")]
    Storage {
        file_id: FileId,
        key: String,
        #[source]
        source: UpstreamError,
    },

    #[error("failed to persist analysis for file {file_id}: {source}")]
    Persist {
        file_id: FileId,
        #[source]
        source: RecordStoreError,
    },
}

impl AnalysisError {
    pub fn file_id(&self) -> FileId {
        match self {
            AnalysisError::Lookup { file_id, .. }
            | AnalysisError::UpstreamFetch { file_id, .. }
            | AnalysisError::UnsupportedFormat { file_id, .. }
            | AnalysisError::Decode { file_id, .. }
            | AnalysisError::Render { file_id, .. }
            | AnalysisError::Storage { file_id, .. }
            | AnalysisError::Persist { file_id, .. } => *file_id,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            AnalysisError::Lookup { .. } => Stage::Lookup,
            AnalysisError::UpstreamFetch { .. } => Stage::Fetch,
            AnalysisError::UnsupportedFormat { .. } => Stage::Validate,
            AnalysisError::Decode { .. } => Stage::Decode,
            AnalysisError::Render { .. } => Stage::Render,
            AnalysisError::Storage { .. } => Stage::Store,
            AnalysisError::Persist { .. } => Stage::Persist,
        }
    }

    /// The caller supplied a file that cannot be analyzed.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnsupportedFormat { .. } | AnalysisError::Decode { .. }
        )
    }

    /// Another request persisted a record for the same file first.
    ///
    /// Retrying `analyze` will return the winner's record from the cache.
    pub fn is_race_lost(&self) -> bool {
        matches!(
            self,
            AnalysisError::Persist { source, .. } if source.is_unique_violation()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> FileId {
        "6f9619ff-8b86-d011-b42d-00c04fc964ff".parse().unwrap()
    }

    #[test]
    fn test_client_fault_classification() {
        let unsupported = AnalysisError::UnsupportedFormat {
            file_id: id(),
            file_name: "report.pdf".to_string(),
        };
        assert!(unsupported.is_client_fault());
        assert_eq!(unsupported.stage(), Stage::Validate);

        let decode = AnalysisError::Decode {
            file_id: id(),
            source: String::from_utf8(vec![0xff, 0xfe]).unwrap_err(),
        };
        assert!(decode.is_client_fault());
        assert_eq!(decode.stage(), Stage::Decode);

        let render = AnalysisError::Render {
            file_id: id(),
            source: UpstreamError::Unavailable("down".to_string()),
        };
        assert!(!render.is_client_fault());
        assert!(!render.is_race_lost());
    }

    #[test]
    fn test_race_lost_only_for_unique_violation() {
        let lost = AnalysisError::Persist {
            file_id: id(),
            source: RecordStoreError::UniqueViolation(id()),
        };
        assert!(lost.is_race_lost());
        assert!(!lost.is_client_fault());

        let other = AnalysisError::Persist {
            file_id: id(),
            source: RecordStoreError::Corrupt("bad row".to_string()),
        };
        assert!(!other.is_race_lost());
    }

    #[test]
    fn test_message_names_file() {
        let err = AnalysisError::Storage {
            file_id: id(),
            key: format!("{}.png", id()),
            source: UpstreamError::Unavailable("bucket offline".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("6f9619ff-8b86-d011-b42d-00c04fc964ff"));
        assert!(msg.contains("bucket offline"));
        assert_eq!(err.file_id(), id());
    }
}
