//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::util::redact_url_password;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context()?;
    ctx.test_connection().await?;
    ctx.init_schema().await?;

    let tables = ctx.list_tables().await?;
    let records = ctx.analyses().count().await?;

    println!(
        "{} Initialized textlens in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!(
        "  Database: {} ({})",
        style(redact_url_password(&settings.database_url())).dim(),
        ctx.backend_name()
    );
    println!("  Tables:   {}", tables.join(", "));
    println!("  Records:  {}", records);
    println!(
        "  Images:   bucket '{}'",
        style(&settings.storage.bucket).dim()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_creates_database_and_artifact_root() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().join("data"),
            ..Settings::default()
        };

        cmd_init(&settings).await.unwrap();
        cmd_init(&settings).await.unwrap();

        assert!(settings.database_path().exists());
        assert!(settings.artifact_root().is_dir());

        let ctx = settings.create_db_context().unwrap();
        assert_eq!(ctx.list_tables().await.unwrap(), vec!["file_analysis_records"]);
        assert_eq!(ctx.analyses().count().await.unwrap(), 0);
    }
}
