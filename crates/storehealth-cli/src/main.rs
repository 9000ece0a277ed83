//! Storehealth CLI
//!
//! Scan a store database for bloat and clean it up.

use anyhow::Result;
use clap::Parser;
use storehealth_core::error::exit_codes;
use storehealth_core::{Config, Database, HealthError, StoreHealth};

mod app;
mod commands;
mod output;

use app::{Cli, Commands, ConfigAction};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<HealthError>()
            .map(HealthError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Config commands never open the store
    if let Commands::Config(args) = &cli.command {
        return match args.action {
            ConfigAction::Path => commands::config::run_path(&config_path),
            ConfigAction::Show => commands::config::run_show(&config_path, cli.format),
        };
    }

    let config = Config::load_from(&config_path)?;
    let db_path = cli.db.clone().unwrap_or_else(Database::default_path);
    tracing::debug!("Opening store database {}", db_path.display());
    let store = StoreHealth::open(&db_path, config)?;

    match cli.command {
        Commands::Scan => commands::scan::run(&store, cli.format),
        Commands::Status => commands::status::run(&store, cli.format),
        Commands::Autoload(args) => commands::autoload::run(args, &store, cli.format),
        Commands::Variations(args) => commands::variations::run(args, &store, cli.format),
        Commands::History(args) => commands::history::run(args, &store, cli.format),
        Commands::Prune(args) => commands::history::run_prune(args, &store),
        Commands::Cleanup(args) => commands::cleanup::run(args, &store, cli.format),
        Commands::Init(args) => commands::init::run(args, &store, &db_path),
        Commands::Config(_) => Ok(()),
    }
}
