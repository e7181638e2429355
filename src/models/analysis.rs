//! Analysis result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FileId, ImageLocation};

/// Counts derived from a decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStatistics {
    pub paragraph_count: u64,
    pub word_count: u64,
    pub character_count: u64,
}

/// Durable result of one analysis, keyed by file identity.
///
/// Created once on a cache miss and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    file_id: FileId,
    image_location: ImageLocation,
    paragraph_count: u64,
    word_count: u64,
    character_count: u64,
    created_at_utc: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a fresh record stamped with the current UTC time.
    pub fn create(file_id: FileId, image_location: ImageLocation, stats: TextStatistics) -> Self {
        Self::restore(file_id, image_location, stats, Utc::now())
    }

    /// Rebuild a record from persisted values.
    pub fn restore(
        file_id: FileId,
        image_location: ImageLocation,
        stats: TextStatistics,
        created_at_utc: DateTime<Utc>,
    ) -> Self {
        Self {
            file_id,
            image_location,
            paragraph_count: stats.paragraph_count,
            word_count: stats.word_count,
            character_count: stats.character_count,
            created_at_utc,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn image_location(&self) -> &ImageLocation {
        &self.image_location
    }

    pub fn paragraph_count(&self) -> u64 {
        self.paragraph_count
    }

    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    pub fn character_count(&self) -> u64 {
        self.character_count
    }

    pub fn created_at_utc(&self) -> DateTime<Utc> {
        self.created_at_utc
    }

    pub fn statistics(&self) -> TextStatistics {
        TextStatistics {
            paragraph_count: self.paragraph_count,
            word_count: self.word_count,
            character_count: self.character_count,
        }
    }
}

/// Raw bytes and declared name of a fetched file. Lives for one request only.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Whether the declared name carries a `.txt` extension (any case).
    pub fn is_plain_text(&self) -> bool {
        let name = self.name.as_str();
        name.len() >= 4
            && name
                .get(name.len() - 4..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(".txt"))
    }
}
