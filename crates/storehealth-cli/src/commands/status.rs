//! Status command

use crate::app::OutputFormat;
use crate::output::{self, csv, json, terminal};
use anyhow::Result;
use storehealth_core::scanner::human_time_diff;
use storehealth_core::StoreHealth;

pub fn run(store: &StoreHealth, format: OutputFormat) -> Result<()> {
    let scan = store.require_last_scan()?;

    match format {
        OutputFormat::Json => json::print(&scan)?,
        OutputFormat::Csv => print!("{}", csv::format_metrics(&scan.metrics)?),
        OutputFormat::Cli => {
            let age = human_time_diff(chrono::Utc::now() - scan.scanned_at);
            let mut out = output::stdout();
            terminal::write_score(&mut out, &scan)?;
            println!(
                "Last scan:    {} ({} ago)",
                scan.scanned_at.format("%Y-%m-%d %H:%M:%S UTC"),
                age
            );
            println!();
            println!("Metrics:");
            terminal::write_metrics(&mut out, &scan)?;
            println!();
            terminal::write_recommendations(&mut out, &scan.recommendations)?;
        }
    }
    Ok(())
}
