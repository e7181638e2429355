//! Show command.

use console::style;

use super::helpers::{parse_file_id, print_record};
use crate::config::Settings;

/// Print a stored analysis. Fails when the file has not been analyzed.
pub async fn cmd_show(settings: &Settings, raw_id: &str, json: bool) -> anyhow::Result<()> {
    let file_id = parse_file_id(raw_id)?;

    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    match ctx.analyses().get(file_id).await? {
        Some(record) => print_record(&record, json),
        None => {
            eprintln!("{} No analysis found for {}", style("✗").red(), file_id);
            anyhow::bail!("analysis not found")
        }
    }
}
