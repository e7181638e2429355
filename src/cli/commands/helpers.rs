//! Output helpers shared by the analysis commands.

use console::style;

use crate::models::{AnalysisRecord, FileId};

/// Parse a file id argument, with a friendly error.
pub fn parse_file_id(raw: &str) -> anyhow::Result<FileId> {
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid file id '{}': {}", raw, e))
}

/// Print a record, as JSON or as a short human summary.
pub fn print_record(record: &AnalysisRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!(
        "{} Analysis for {}",
        style("✓").green(),
        style(record.file_id()).bold()
    );
    println!("  {:<12} {}", "Paragraphs:", record.paragraph_count());
    println!("  {:<12} {}", "Words:", record.word_count());
    println!("  {:<12} {}", "Characters:", record.character_count());
    println!("  {:<12} {}", "Image:", record.image_location());
    println!(
        "  {:<12} {}",
        "Created:",
        record.created_at_utc().format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
