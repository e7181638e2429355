//! In-memory analysis record store.
//!
//! Records live as long as the process. Useful for embedding the pipeline
//! without a database and for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{AnalysisRecord, FileId};
use crate::services::{AnalysisRecordStore, RecordStoreError};

#[derive(Default)]
pub struct MemoryAnalysisRepository {
    records: Mutex<HashMap<FileId, AnalysisRecord>>,
}

impl MemoryAnalysisRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<FileId, AnalysisRecord>> {
        // A poisoned map is still structurally valid.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AnalysisRecordStore for MemoryAnalysisRepository {
    async fn find(&self, file_id: FileId) -> Result<Option<AnalysisRecord>, RecordStoreError> {
        Ok(self.lock().get(&file_id).cloned())
    }

    async fn insert(&self, record: &AnalysisRecord) -> Result<(), RecordStoreError> {
        use std::collections::hash_map::Entry;

        match self.lock().entry(record.file_id()) {
            Entry::Occupied(_) => Err(RecordStoreError::UniqueViolation(record.file_id())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageLocation, TextStatistics};

    #[tokio::test]
    async fn test_insert_once_per_file() {
        let repo = MemoryAnalysisRepository::new();
        let file_id = FileId::generate();
        let record = AnalysisRecord::create(
            file_id,
            ImageLocation::new("key.png").unwrap(),
            TextStatistics::default(),
        );

        repo.insert(&record).await.unwrap();
        let err = repo.insert(&record).await.unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find(file_id).await.unwrap(), Some(record));
    }
}
