//! Collaborators of the analysis pipeline.
//!
//! Each external dependency sits behind a narrow async trait so the
//! orchestrator can be driven by HTTP clients in production and by
//! in-memory fakes in tests.

pub mod error;
pub mod file_storage;
pub mod word_cloud;

use async_trait::async_trait;

use crate::models::{AnalysisRecord, FileId, ImageLocation, SourceFile};

pub use error::{RecordStoreError, UpstreamError};
pub use file_storage::HttpFileFetcher;
pub use word_cloud::{WordCloudClient, WordCloudOptions};

/// Retrieves a source file by id.
#[async_trait]
pub trait SourceFileFetcher: Send + Sync {
    async fn fetch(&self, file_id: FileId) -> Result<SourceFile, UpstreamError>;
}

/// Renders word-cloud image bytes from text.
#[async_trait]
pub trait ImageArtifactGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> Result<Vec<u8>, UpstreamError>;
}

/// Writes image bytes to `(bucket, key)` and returns the stored location.
///
/// Writing the same key twice overwrites the earlier object.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageLocation, UpstreamError>;
}

/// Reads back stored image bytes. `None` when the key does not exist.
#[async_trait]
pub trait ArtifactReader: Send + Sync {
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, UpstreamError>;
}

/// Durable analysis records keyed by file id.
#[async_trait]
pub trait AnalysisRecordStore: Send + Sync {
    async fn find(&self, file_id: FileId) -> Result<Option<AnalysisRecord>, RecordStoreError>;

    /// Insert a new record. A second insert for the same file id must fail
    /// with [`RecordStoreError::UniqueViolation`].
    async fn insert(&self, record: &AnalysisRecord) -> Result<(), RecordStoreError>;
}
