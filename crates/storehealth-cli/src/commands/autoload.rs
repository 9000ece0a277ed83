//! Autoload command

use crate::app::{AutoloadArgs, OutputFormat};
use crate::output::{csv, json};
use anyhow::Result;
use storehealth_core::StoreHealth;

pub fn run(args: AutoloadArgs, store: &StoreHealth, format: OutputFormat) -> Result<()> {
    let options = store.get_top_autoloaded(args.limit)?;

    match format {
        OutputFormat::Json => json::print(&options)?,
        OutputFormat::Csv => print!("{}", csv::format_rows(&options)?),
        OutputFormat::Cli => {
            if options.is_empty() {
                println!("No autoloaded options.");
            }
            for option in &options {
                println!("{:>12}  {}", option.size, option.name);
            }
        }
    }
    Ok(())
}
