//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "storehealth")]
#[command(author, version, about = "Diagnose and clean up store database bloat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "STOREHEALTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store database (defaults to the user cache directory)
    #[arg(long, global = true, env = "STOREHEALTH_DB")]
    pub db: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a health scan and store the result
    Scan,

    /// Show the last scan
    Status,

    /// List the largest autoloaded options
    Autoload(AutoloadArgs),

    /// List products with many variations
    Variations(VariationsArgs),

    /// Show the stored history of one metric
    History(HistoryArgs),

    /// Delete metric snapshots older than N days
    Prune(PruneArgs),

    /// Preview or run cleanup operations
    Cleanup(CleanupArgs),

    /// Show configuration
    Config(ConfigArgs),

    /// Create the database schema
    Init(InitArgs),
}

#[derive(Args)]
pub struct AutoloadArgs {
    /// Number of options (1-50)
    #[arg(short = 'n', default_value = "10")]
    pub limit: usize,
}

#[derive(Args)]
pub struct VariationsArgs {
    /// Minimum variation count
    #[arg(long, default_value = "50")]
    pub threshold: usize,

    /// Number of products
    #[arg(short = 'n', default_value = "10")]
    pub limit: usize,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Metric key (e.g. autoload_size)
    pub metric: String,

    /// Number of snapshots
    #[arg(short = 'n', default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct PruneArgs {
    /// Keep snapshots newer than this many days
    #[arg(long, default_value = "90")]
    pub days: u32,
}

#[derive(Args)]
pub struct CleanupArgs {
    #[command(subcommand)]
    pub action: CleanupAction,
}

#[derive(Subcommand)]
pub enum CleanupAction {
    /// Count what a cleanup would remove
    Preview { cleanup_type: String },
    /// Run a cleanup
    Run { cleanup_type: String },
    /// Preview counts for every cleanup type
    Counts,
    /// List cleanup types
    Types,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Args)]
pub struct InitArgs {
    /// Also create the customer session table
    #[arg(long)]
    pub with_sessions: bool,

    /// Also create the high-performance order table
    #[arg(long)]
    pub with_orders: bool,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Csv,
}
