//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// embedcache - persistent embedding cache
///
/// Computes an embedding for every matching file in a project, reusing
/// stored embeddings from earlier runs.
#[derive(Parser, Debug)]
#[command(name = "embedcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "EMBEDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .embedcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed every matching file, reusing stored embeddings
    Build(BuildArgs),

    /// List stored embeddings
    List(ListArgs),

    /// Remove stored embeddings whose files no longer exist
    Prune(PruneArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Store location overrides shared by commands that open the store
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Durable store path (relative paths resolve against the project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Staging file used for the atomic replace
    #[arg(long)]
    pub staging: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Project root (defaults to current directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Extensions to embed (comma-separated, e.g. .ts,.tsx)
    #[arg(long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Producer command, split on whitespace (overrides config).
    ///
    /// Quoting is not interpreted, so `sh -c '...'` cannot be passed here;
    /// set `[producer] command` in .embedcache.toml for arguments that
    /// contain spaces.
    #[arg(long)]
    pub embed_command: Option<String>,

    /// Maximum concurrent producer invocations
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Disable the secondary on-disk cache
    #[arg(long)]
    pub no_secondary: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Project root (defaults to current directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the prune command
#[derive(Parser, Debug)]
pub struct PruneArgs {
    /// Project root (defaults to current directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Dry run - show what would be removed
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_build() {
        let cli = Cli::parse_from([
            "embedcache",
            "build",
            "web",
            "--ext",
            ".ts,.tsx",
            "-j",
            "4",
            "--embed-command",
            "embed --model small",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.root, Some(PathBuf::from("web")));
                assert_eq!(args.ext, vec![".ts", ".tsx"]);
                assert_eq!(args.jobs, Some(4));
                assert_eq!(args.embed_command.as_deref(), Some("embed --model small"));
                assert!(!args.no_secondary);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn cli_parses_store_overrides() {
        let cli = Cli::parse_from([
            "embedcache",
            "list",
            "--output",
            "out.json",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.store.output, Some(PathBuf::from("out.json")));
                assert!(matches!(args.format, OutputFormat::Json));
            }
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_parses_prune_dry_run() {
        let cli = Cli::parse_from(["embedcache", "prune", "--dry-run"]);
        match cli.command {
            Commands::Prune(args) => {
                assert!(args.dry_run);
                assert!(args.root.is_none());
            }
            _ => panic!("expected Prune command"),
        }
    }

    #[test]
    fn cli_no_local_flag() {
        let cli = Cli::parse_from(["embedcache", "--no-local", "config", "path"]);
        assert!(cli.no_local);
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["embedcache", "list"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["embedcache", "-v", "list"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["embedcache", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
