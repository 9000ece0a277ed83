//! History and prune commands

use crate::app::{HistoryArgs, OutputFormat, PruneArgs};
use crate::output::{csv, json};
use anyhow::Result;
use storehealth_core::scanner::SNAPSHOT_METRICS;
use storehealth_core::{HealthError, StoreHealth};

pub fn run(args: HistoryArgs, store: &StoreHealth, format: OutputFormat) -> Result<()> {
    if !SNAPSHOT_METRICS.contains(&args.metric.as_str()) {
        return Err(HealthError::InvalidInput(format!(
            "no history is kept for '{}' (available: {})",
            args.metric,
            SNAPSHOT_METRICS.join(", ")
        ))
        .into());
    }

    let history = store.metric_history(&args.metric, args.limit)?;

    match format {
        OutputFormat::Json => json::print(&history)?,
        OutputFormat::Csv => print!("{}", csv::format_rows(&history)?),
        OutputFormat::Cli => {
            if history.is_empty() {
                println!("No snapshots for {}. Run a scan first.", args.metric);
            }
            for snapshot in &history {
                println!("{}  {:>12}", snapshot.created_at, snapshot.metric_value);
            }
        }
    }
    Ok(())
}

pub fn run_prune(args: PruneArgs, store: &StoreHealth) -> Result<()> {
    let pruned = store.scanner().prune_snapshots(args.days)?;
    println!("Removed {} snapshot rows older than {} days", pruned, args.days);
    Ok(())
}
