//! Diesel ORM models for database tables.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use crate::models::{AnalysisRecord, FileId, ImageLocation, TextStatistics};
use crate::schema;
use crate::services::RecordStoreError;

/// Analysis row from the database.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::file_analysis_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisRow {
    pub file_id: String,
    pub image_location: String,
    pub paragraph_count: i64,
    pub word_count: i64,
    pub character_count: i64,
    pub created_at_utc: String,
}

/// New analysis row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::file_analysis_records)]
pub struct NewAnalysisRow {
    pub file_id: String,
    pub image_location: String,
    pub paragraph_count: i64,
    pub word_count: i64,
    pub character_count: i64,
    pub created_at_utc: String,
}

/// Timestamps are stored as RFC 3339 with full sub-second precision so a
/// stored record reads back identical to the one inserted.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn count_to_db(field: &str, value: u64) -> Result<i64, RecordStoreError> {
    i64::try_from(value)
        .map_err(|_| RecordStoreError::Corrupt(format!("{field} {value} exceeds column range")))
}

fn count_from_db(field: &str, value: i64) -> Result<u64, RecordStoreError> {
    u64::try_from(value)
        .map_err(|_| RecordStoreError::Corrupt(format!("negative {field}: {value}")))
}

impl TryFrom<&AnalysisRecord> for NewAnalysisRow {
    type Error = RecordStoreError;

    fn try_from(record: &AnalysisRecord) -> Result<Self, Self::Error> {
        Ok(NewAnalysisRow {
            file_id: record.file_id().to_string(),
            image_location: record.image_location().as_str().to_string(),
            paragraph_count: count_to_db("paragraph_count", record.paragraph_count())?,
            word_count: count_to_db("word_count", record.word_count())?,
            character_count: count_to_db("character_count", record.character_count())?,
            created_at_utc: format_timestamp(&record.created_at_utc()),
        })
    }
}

/// Convert a database row to a domain model.
impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = RecordStoreError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let file_id: FileId = row
            .file_id
            .parse()
            .map_err(|e| RecordStoreError::Corrupt(format!("file_id '{}': {}", row.file_id, e)))?;
        let image_location = ImageLocation::new(row.image_location)
            .map_err(|e| RecordStoreError::Corrupt(format!("image_location for {file_id}: {e}")))?;
        let created_at_utc = DateTime::parse_from_rfc3339(&row.created_at_utc)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                RecordStoreError::Corrupt(format!(
                    "created_at_utc '{}' for {}: {}",
                    row.created_at_utc, file_id, e
                ))
            })?;
        let stats = TextStatistics {
            paragraph_count: count_from_db("paragraph_count", row.paragraph_count)?,
            word_count: count_from_db("word_count", row.word_count)?,
            character_count: count_from_db("character_count", row.character_count)?,
        };

        Ok(AnalysisRecord::restore(
            file_id,
            image_location,
            stats,
            created_at_utc,
        ))
    }
}
