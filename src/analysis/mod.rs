//! Text analysis: statistics, failure taxonomy and the pipeline itself.

pub mod error;
pub mod orchestrator;
pub mod stats;

pub use error::{AnalysisError, Stage};
pub use orchestrator::{AnalysisOrchestrator, OrchestratorConfig};
pub use stats::compute as compute_statistics;
