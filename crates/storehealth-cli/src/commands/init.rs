//! Init command

use crate::app::InitArgs;
use anyhow::Result;
use std::path::Path;
use storehealth_core::StoreHealth;

pub fn run(args: InitArgs, store: &StoreHealth, path: &Path) -> Result<()> {
    if args.with_sessions {
        store.db().create_sessions_table()?;
    }
    if args.with_orders {
        store.db().create_orders_table()?;
    }

    let version = store.db().schema_version()?.unwrap_or(0);
    println!("Initialized {} (schema v{})", path.display(), version);
    Ok(())
}
