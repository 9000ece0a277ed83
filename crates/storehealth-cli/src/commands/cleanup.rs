//! Cleanup command

use crate::app::{CleanupAction, CleanupArgs, OutputFormat};
use crate::output::{csv, json};
use anyhow::Result;
use serde::Serialize;
use storehealth_core::{CleanupErrorKind, HealthError, StoreHealth};

pub fn run(args: CleanupArgs, store: &StoreHealth, format: OutputFormat) -> Result<()> {
    match args.action {
        CleanupAction::Preview { cleanup_type } => {
            let response = store.preview_cleanup(&cleanup_type);
            match format {
                OutputFormat::Json => json::print(&response)?,
                OutputFormat::Csv => print!("{}", csv::format_rows(&[&response])?),
                OutputFormat::Cli if response.success => {
                    println!("{}: {}", cleanup_type, response.message)
                }
                OutputFormat::Cli => {}
            }
            check(&cleanup_type, response.error, &response.message)
        }
        CleanupAction::Run { cleanup_type } => {
            let response = store.execute_cleanup(&cleanup_type);
            match format {
                OutputFormat::Json => json::print(&response)?,
                OutputFormat::Csv => print!("{}", csv::format_rows(&[&response])?),
                OutputFormat::Cli if response.success => println!(
                    "{}: {} ({} before, {} remaining)",
                    cleanup_type, response.message, response.before, response.after
                ),
                OutputFormat::Cli => {}
            }
            check(&cleanup_type, response.error, &response.message)
        }
        CleanupAction::Counts => {
            let counts = store.cleanup_counts();
            match format {
                OutputFormat::Json => json::print(&counts)?,
                OutputFormat::Csv => {
                    let rows: Vec<CountRow> = counts
                        .iter()
                        .map(|(cleanup_type, count)| CountRow {
                            cleanup_type,
                            count: *count,
                        })
                        .collect();
                    print!("{}", csv::format_rows(&rows)?);
                }
                OutputFormat::Cli => {
                    for (cleanup_type, count) in &counts {
                        println!("{:<16} {}", cleanup_type, count);
                    }
                }
            }
            Ok(())
        }
        CleanupAction::Types => {
            let types = store.cleanup_types();
            match format {
                OutputFormat::Json => json::print(&types)?,
                OutputFormat::Csv => print!("{}", csv::format_rows(&types)?),
                OutputFormat::Cli => {
                    for info in &types {
                        println!("{:<16} {} - {}", info.cleanup_type, info.name, info.description);
                    }
                }
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct CountRow<'a> {
    #[serde(rename = "type")]
    cleanup_type: &'a str,
    count: usize,
}

/// Turn a failed envelope into an error carrying the right exit code
fn check(cleanup_type: &str, error: Option<CleanupErrorKind>, message: &str) -> Result<()> {
    match error {
        None => Ok(()),
        Some(CleanupErrorKind::InvalidCategory) => {
            Err(HealthError::InvalidCategory(cleanup_type.to_string()).into())
        }
        Some(CleanupErrorKind::OperationFailed) => {
            Err(HealthError::Cleanup(message.to_string()).into())
        }
    }
}
