//! modcache - Local cache for remote debug-target modules
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use modcache::cli::{Cli, Commands};
use modcache::config::ConfigManager;
use modcache::error::ModCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ModCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug; config.general.verbose counts as -v
    let verbosity = cli.verbose.max(u8::from(config.general.verbose));
    let filter = match verbosity {
        0 => EnvFilter::new("modcache=warn"),
        1 => EnvFilter::new("modcache=info"),
        _ => EnvFilter::new("modcache=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Fetch(args) => modcache::cli::commands::fetch(args, &config).await,
        Commands::Paths(args) => modcache::cli::commands::paths(args, &config).await,
        Commands::Config(args) => {
            modcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
