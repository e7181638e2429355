//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod helpers;
mod init;
mod serve;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "textlens")]
#[command(about = "Text file statistics and word-cloud analysis service")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./textlens.toml when present)
    #[arg(short, long, global = true, env = "TEXTLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the HTTP API
    Serve {
        /// Address to bind (e.g., 5002, 127.0.0.1:5002, 0.0.0.0)
        bind: Option<String>,
    },

    /// Analyze a file (or print its existing analysis)
    Analyze {
        /// File identifier (UUID)
        file_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a stored analysis without running one
    Show {
        /// File identifier (UUID)
        file_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        ignore_env: false,
    };
    let mut settings = load_settings(&options)?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Analyze { file_id, json } => {
            analyze::cmd_analyze(&settings, &file_id, json).await
        }
        Commands::Show { file_id, json } => show::cmd_show(&settings, &file_id, json).await,
    }
}
