//! HTTP request handlers for the web server.

mod analytics;
mod images;
mod types;

pub use analytics::{analyze_file, get_analysis};
pub use images::{health, serve_image};
pub use types::{status_for, AnalysisResponse, ErrorBody};
