//! The analysis pipeline.
//!
//! `analyze` runs lookup, fetch, validate, decode, count, render, store and
//! persist in that order, each awaited before the next. A stored record is the
//! only cache: once it exists the file is never fetched or rendered again.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::AnalysisError;
use super::stats;
use crate::config::{Settings, DEFAULT_BUCKET};
use crate::models::{AnalysisRecord, FileId};
use crate::services::{
    AnalysisRecordStore, ArtifactStore, HttpFileFetcher, ImageArtifactGenerator,
    SourceFileFetcher, UpstreamError, WordCloudClient,
};
use crate::storage::artifact_key;

/// Values the pipeline needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Bucket that receives rendered images.
    pub bucket: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

/// Coordinates the collaborators for one analysis request at a time.
///
/// Holds no per-request state; clones share the same collaborators and any
/// number of requests may run concurrently.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    records: Arc<dyn AnalysisRecordStore>,
    fetcher: Arc<dyn SourceFileFetcher>,
    renderer: Arc<dyn ImageArtifactGenerator>,
    artifacts: Arc<dyn ArtifactStore>,
    config: OrchestratorConfig,
}

impl AnalysisOrchestrator {
    pub fn new(
        records: Arc<dyn AnalysisRecordStore>,
        fetcher: Arc<dyn SourceFileFetcher>,
        renderer: Arc<dyn ImageArtifactGenerator>,
        artifacts: Arc<dyn ArtifactStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            records,
            fetcher,
            renderer,
            artifacts,
            config,
        }
    }

    /// Wire the HTTP file fetcher and word-cloud client from settings.
    pub fn from_settings(
        settings: &Settings,
        records: Arc<dyn AnalysisRecordStore>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Result<Self, UpstreamError> {
        Ok(Self::new(
            records,
            Arc::new(HttpFileFetcher::new(&settings.file_storage)?),
            Arc::new(WordCloudClient::new(&settings.word_cloud)?),
            artifacts,
            OrchestratorConfig {
                bucket: settings.storage.bucket.clone(),
            },
        ))
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Analyze a file, or return its existing record.
    ///
    /// Two concurrent calls that both miss the cache both run the full
    /// pipeline. The record store admits only one insert; the other caller
    /// gets a `Persist` error for which [`AnalysisError::is_race_lost`] is
    /// true, and a retry returns the winning record.
    ///
    /// Dropping the returned future aborts at the pending collaborator call.
    /// The record is inserted last, so an abort never leaves a record behind.
    pub async fn analyze(&self, file_id: FileId) -> Result<AnalysisRecord, AnalysisError> {
        let result = self.run(file_id).await;
        if let Err(ref e) = result {
            warn!(
                file_id = %file_id,
                stage = %e.stage(),
                "Analysis failed: {}",
                e
            );
        }
        result
    }

    async fn run(&self, file_id: FileId) -> Result<AnalysisRecord, AnalysisError> {
        if let Some(existing) = self.lookup(file_id).await? {
            info!(file_id = %file_id, "Returning cached analysis");
            return Ok(existing);
        }

        debug!(file_id = %file_id, "No cached analysis, fetching source file");
        let file = self
            .fetcher
            .fetch(file_id)
            .await
            .map_err(|source| AnalysisError::UpstreamFetch { file_id, source })?;

        if !file.is_plain_text() {
            return Err(AnalysisError::UnsupportedFormat {
                file_id,
                file_name: file.name,
            });
        }

        let text = String::from_utf8(file.content)
            .map_err(|source| AnalysisError::Decode { file_id, source })?;

        let statistics = stats::compute(&text);
        debug!(
            file_id = %file_id,
            paragraphs = statistics.paragraph_count,
            words = statistics.word_count,
            characters = statistics.character_count,
            "Computed text statistics"
        );

        let image = self
            .renderer
            .generate(&text)
            .await
            .map_err(|source| AnalysisError::Render { file_id, source })?;

        let key = artifact_key(file_id);
        let stored = self.artifacts.store(&self.config.bucket, &key, image).await;
        let location = match stored {
            Ok(location) => location,
            Err(source) => return Err(AnalysisError::Storage { file_id, key, source }),
        };
        debug!(file_id = %file_id, location = %location, "Stored word cloud");

        let record = AnalysisRecord::create(file_id, location, statistics);
        self.records
            .insert(&record)
            .await
            .map_err(|source| AnalysisError::Persist { file_id, source })?;

        info!(
            file_id = %file_id,
            words = record.word_count(),
            "Analysis complete"
        );
        Ok(record)
    }

    /// Read-only lookup. Never triggers an analysis; `None` means not analyzed yet.
    pub async fn get_analysis(
        &self,
        file_id: FileId,
    ) -> Result<Option<AnalysisRecord>, AnalysisError> {
        self.lookup(file_id).await.inspect_err(|e| {
            warn!(file_id = %file_id, stage = %e.stage(), "Analysis lookup failed: {}", e);
        })
    }

    async fn lookup(&self, file_id: FileId) -> Result<Option<AnalysisRecord>, AnalysisError> {
        self.records
            .find(file_id)
            .await
            .map_err(|source| AnalysisError::Lookup { file_id, source })
    }
}
