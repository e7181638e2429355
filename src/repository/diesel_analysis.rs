//! Diesel-based analysis record repository.
//!
//! Works against either backend through the `with_conn!` dispatch. Rows are
//! insert-only; the primary key on `file_id` is what serializes concurrent
//! first requests for the same file.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;

use super::models::{AnalysisRow, NewAnalysisRow};
use super::pool::{DbPool, DieselError};
use crate::models::{AnalysisRecord, FileId};
use crate::schema::file_analysis_records;
use crate::services::{AnalysisRecordStore, RecordStoreError};
use crate::with_conn;

/// Diesel-based analysis repository.
#[derive(Clone)]
pub struct DieselAnalysisRepository {
    pool: DbPool,
}

impl DieselAnalysisRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the record for a file, if one was persisted.
    pub async fn get(&self, file_id: FileId) -> Result<Option<AnalysisRecord>, RecordStoreError> {
        let key = file_id.to_string();
        let row = self.load_row(&key).await?;
        row.map(AnalysisRecord::try_from).transpose()
    }

    async fn load_row(&self, key: &str) -> Result<Option<AnalysisRow>, DieselError> {
        with_conn!(self.pool, conn => {
            file_analysis_records::table
                .find(key)
                .select(AnalysisRow::as_select())
                .first::<AnalysisRow>(&mut conn)
                .await
                .optional()
        })
    }

    /// Insert a record. Fails with `UniqueViolation` if the file already has one.
    pub async fn insert(&self, record: &AnalysisRecord) -> Result<(), RecordStoreError> {
        let row = NewAnalysisRow::try_from(record)?;
        match self.insert_row(&row).await {
            Ok(_) => Ok(()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(RecordStoreError::UniqueViolation(record.file_id()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_row(&self, row: &NewAnalysisRow) -> Result<usize, DieselError> {
        with_conn!(self.pool, conn => {
            diesel::insert_into(file_analysis_records::table)
                .values(row)
                .execute(&mut conn)
                .await
        })
    }

    /// Count stored records.
    pub async fn count(&self) -> Result<u64, RecordStoreError> {
        let count = self.count_rows().await?;
        Ok(count.max(0) as u64)
    }

    async fn count_rows(&self) -> Result<i64, DieselError> {
        use diesel::dsl::count_star;
        with_conn!(self.pool, conn => {
            file_analysis_records::table
                .select(count_star())
                .first::<i64>(&mut conn)
                .await
        })
    }
}

#[async_trait]
impl AnalysisRecordStore for DieselAnalysisRepository {
    async fn find(&self, file_id: FileId) -> Result<Option<AnalysisRecord>, RecordStoreError> {
        self.get(file_id).await
    }

    async fn insert(&self, record: &AnalysisRecord) -> Result<(), RecordStoreError> {
        DieselAnalysisRepository::insert(self, record).await
    }
}
