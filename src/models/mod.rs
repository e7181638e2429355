//! Domain models for textlens.

mod analysis;
mod file_id;
mod image_location;

pub use analysis::{AnalysisRecord, SourceFile, TextStatistics};
pub use file_id::{FileId, InvalidFileId};
pub use image_location::{ImageLocation, InvalidImageLocation};
