//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modcache - Local cache for remote debug-target modules
///
/// Keeps modules fetched from a remote target in a local cache with a
/// UUID view and a per-host sysroot view.
#[derive(Parser, Debug)]
#[command(name = "modcache")]
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
    #[arg(short, long, global = true, env = "MODCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a module into the cache (no-op if already cached)
    Fetch(FetchArgs),

    /// Print the cache locations of a module without touching disk
    Paths(PathsArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Module identity and cache location, shared by fetch and paths
#[derive(Parser, Debug)]
pub struct ModuleArgs {
    /// Full path of the module on the target
    pub path: PathBuf,

    /// Module UUID, if known
    #[arg(short, long)]
    pub uuid: Option<String>,

    /// Architecture triple, if known
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Platform name (default: from config)
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Target hostname (default: from config)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Cache root directory (default: from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub module: ModuleArgs,

    /// Local mirror of the target filesystem (repeatable, searched first)
    #[arg(short, long)]
    pub mirror: Vec<PathBuf>,

    /// Skip fetching separate debug-symbol files
    #[arg(long)]
    pub no_symbols: bool,
}

/// Arguments for the paths command
#[derive(Parser, Debug)]
pub struct PathsArgs {
    #[command(flatten)]
    pub module: ModuleArgs,
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable key/value lines
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
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

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value (e.g. cache.hostname ubuntu)
    Set {
        /// Dot-separated key
        key: String,

        /// New value
        value: String,
    },
}
