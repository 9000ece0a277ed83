//! Config command

use crate::app::OutputFormat;
use crate::output::json;
use anyhow::Result;
use std::path::Path;
use storehealth_core::Config;

pub fn run_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}

pub fn run_show(path: &Path, format: OutputFormat) -> Result<()> {
    let config = Config::load_from(path)?;

    match format {
        OutputFormat::Json => json::print(&config)?,
        _ => {
            let source = if path.exists() { "file" } else { "defaults" };
            println!("# {} ({})", path.display(), source);
            print!("{}", config.to_yaml()?);
        }
    }
    Ok(())
}
