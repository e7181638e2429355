//! Web server command.

use console::style;

use crate::config::Settings;

/// Port used when a bind address names only a host.
const DEFAULT_PORT: u16 = 5002;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    settings.ensure_directories()?;

    println!("{} Preparing database...", style("→").cyan());
    let ctx = settings.create_db_context()?;
    match ctx.init_schema().await {
        Ok(()) => {
            println!("  {} Database ready", style("✓").green());
        }
        Err(e) => {
            eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
            return Err(anyhow::anyhow!("Database setup failed: {}", e));
        }
    }

    println!(
        "{} Starting textlens server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "5002" -> 127.0.0.1:5002
/// - Just a host: "0.0.0.0" -> 0.0.0.0:5002
/// - Host and port: "0.0.0.0:5002" -> 0.0.0.0:5002
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("bind address must not be empty");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), DEFAULT_PORT))
}
