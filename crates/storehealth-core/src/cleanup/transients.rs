use super::CleanupOperation;
use crate::db::{Database, TRANSIENT_PREFIX, TRANSIENT_TIMEOUT_PREFIX};
use crate::error::Result;
use chrono::Utc;

/// Removes expired transients (timeout row plus value row)
#[derive(Debug, Default)]
pub struct TransientCleaner;

impl TransientCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl CleanupOperation for TransientCleaner {
    fn cleanup_type(&self) -> &'static str {
        "transients"
    }

    fn name(&self) -> &'static str {
        "Expired Transients"
    }

    fn description(&self) -> &'static str {
        "Remove cached transients whose expiry has passed"
    }

    /// Number of expired transients (pairs, not rows)
    fn preview(&self, db: &Database) -> Result<usize> {
        let count = db.expired_transient_count(Utc::now().timestamp())?;
        Ok(count as usize)
    }

    /// Number of option rows deleted, so up to two per transient
    fn execute(&self, db: &Database) -> Result<usize> {
        let timeouts = db.expired_transient_timeouts(Utc::now().timestamp())?;

        let mut deleted = 0;
        for timeout in &timeouts {
            let Some(key) = timeout.strip_prefix(TRANSIENT_TIMEOUT_PREFIX) else {
                continue;
            };
            deleted += db.delete_option(timeout)?;
            deleted += db.delete_option(&format!("{}{}", TRANSIENT_PREFIX, key))?;
        }

        tracing::debug!(
            "Deleted {} rows for {} expired transients",
            deleted,
            timeouts.len()
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts_pairs_execute_counts_rows() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let far_future = Utc::now().timestamp() + 3600;
        for key in ["a", "b", "c"] {
            db.set_transient(key, "stale", 100).unwrap();
        }
        db.set_transient("live1", "fresh", far_future).unwrap();
        db.set_transient("live2", "fresh", far_future).unwrap();

        let cleaner = TransientCleaner::new();
        assert_eq!(cleaner.preview(&db).unwrap(), 3);
        assert_eq!(cleaner.execute(&db).unwrap(), 6);
        assert_eq!(cleaner.preview(&db).unwrap(), 0);
        assert_eq!(cleaner.execute(&db).unwrap(), 0);

        assert_eq!(db.transient_count().unwrap(), 2);
        assert!(db.get_option("_transient_live1").unwrap().is_some());
    }

    #[test]
    fn test_timeout_without_value_row() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.set_option("_transient_timeout_lonely", "5", false).unwrap();

        let cleaner = TransientCleaner::new();
        assert_eq!(cleaner.preview(&db).unwrap(), 1);
        assert_eq!(cleaner.execute(&db).unwrap(), 1);
        assert_eq!(cleaner.preview(&db).unwrap(), 0);
    }
}
