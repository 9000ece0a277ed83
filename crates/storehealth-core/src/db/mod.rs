//! Database layer for storehealth
//!
//! Provides SQLite-backed storage with:
//! - The store tables that are diagnosed (options, posts, postmeta, ...)
//! - Optional session and order tables
//! - Scan persistence (last scan + metric snapshots)

mod options;
mod orders;
mod postmeta;
mod posts;
mod scans;
mod schema;
mod sessions;

pub use options::{AutoloadedOption, TRANSIENT_PREFIX, TRANSIENT_TIMEOUT_PREFIX};
pub use orders::ORDERS_TABLE;
pub use posts::{
    NewPost, VariationGroup, POST_STATUS_TRASH, POST_TYPE_PRODUCT, POST_TYPE_REVISION,
    POST_TYPE_SHOP_ORDER, POST_TYPE_VARIATION,
};
pub use scans::MetricSnapshot;
pub use schema::Database;
pub use sessions::SESSIONS_TABLE;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("store.sqlite")
    }
}

/// Bind a count as an SQL integer, saturating at `i64::MAX`
pub(crate) fn sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
