//! Variations command

use crate::app::{OutputFormat, VariationsArgs};
use crate::output::{csv, json};
use anyhow::Result;
use storehealth_core::StoreHealth;

pub fn run(args: VariationsArgs, store: &StoreHealth, format: OutputFormat) -> Result<()> {
    let products = store.get_high_variation(args.threshold, args.limit)?;

    match format {
        OutputFormat::Json => json::print(&products)?,
        OutputFormat::Csv => print!("{}", csv::format_rows(&products)?),
        OutputFormat::Cli => {
            if products.is_empty() {
                println!("No products with {} or more variations.", args.threshold);
            }
            for product in &products {
                println!(
                    "{:>6} variations  #{} {}",
                    product.variation_count, product.id, product.title
                );
            }
        }
    }
    Ok(())
}
