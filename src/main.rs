//! embedcache - persistent embedding cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use embedcache::cli::{Cli, Commands};
use embedcache::config::ConfigManager;
use embedcache::error::{EmbedCacheError, EmbedCacheResult};
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

async fn run() -> EmbedCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| EmbedCacheError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("embedcache=warn"),
        1 => EnvFilter::new("embedcache=info"),
        _ => EnvFilter::new("embedcache=debug"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }

    match cli.command {
        Commands::Build(args) => embedcache::cli::commands::build(args, &config).await,
        Commands::List(args) => embedcache::cli::commands::list(args, &config).await,
        Commands::Prune(args) => embedcache::cli::commands::prune(args, &config).await,
        Commands::Config(args) => {
            embedcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
