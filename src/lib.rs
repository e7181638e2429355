//! textlens - text file statistics and word-cloud analysis.
//!
//! Fetches a stored `.txt` file, counts paragraphs, words and characters,
//! renders a word cloud, stores the image and records the result once per
//! file. Later requests for the same file return the recorded result.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod http_client;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
pub mod storage;

pub use analysis::{AnalysisError, AnalysisOrchestrator, OrchestratorConfig, Stage};
pub use models::{AnalysisRecord, FileId, ImageLocation, SourceFile, TextStatistics};
