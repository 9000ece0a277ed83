//! Scan command

use crate::app::OutputFormat;
use crate::output::{self, csv, json, terminal};
use anyhow::Result;
use storehealth_core::StoreHealth;

pub fn run(store: &StoreHealth, format: OutputFormat) -> Result<()> {
    let result = store.run_scan()?;

    match format {
        OutputFormat::Json => json::print(&result)?,
        OutputFormat::Csv => print!("{}", csv::format_metrics(&result.metrics)?),
        OutputFormat::Cli => {
            let mut out = output::stdout();
            terminal::write_scan(&mut out, &result)?;
        }
    }
    Ok(())
}
