//! Analyze command.

use std::sync::Arc;

use console::style;

use super::helpers::{parse_file_id, print_record};
use crate::analysis::AnalysisOrchestrator;
use crate::config::Settings;
use crate::storage::ArtifactBackend;

/// Analyze one file and print the resulting (or cached) record.
pub async fn cmd_analyze(settings: &Settings, raw_id: &str, json: bool) -> anyhow::Result<()> {
    let file_id = parse_file_id(raw_id)?;

    settings.ensure_directories()?;
    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    let backend = ArtifactBackend::from_settings(settings)?;
    let orchestrator =
        AnalysisOrchestrator::from_settings(settings, Arc::new(ctx.analyses()), backend.store)?;

    if !json {
        println!("{} Analyzing {}...", style("→").cyan(), file_id);
    }

    match orchestrator.analyze(file_id).await {
        Ok(record) => print_record(&record, json),
        Err(e) => {
            eprintln!(
                "{} Analysis failed at {} stage: {}",
                style("✗").red(),
                e.stage(),
                e
            );
            if e.is_race_lost() {
                eprintln!("  Another request finished first; run the command again to read it");
            }
            Err(e.into())
        }
    }
}
