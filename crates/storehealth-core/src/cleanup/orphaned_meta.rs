use super::CleanupOperation;
use crate::db::Database;
use crate::error::Result;

/// Removes metadata rows whose record no longer exists, in batches
#[derive(Debug)]
pub struct OrphanedMetaCleaner {
    batch_size: usize,
}

impl OrphanedMetaCleaner {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl CleanupOperation for OrphanedMetaCleaner {
    fn cleanup_type(&self) -> &'static str {
        "orphaned_meta"
    }

    fn name(&self) -> &'static str {
        "Orphaned Postmeta"
    }

    fn description(&self) -> &'static str {
        "Remove metadata rows left behind by deleted records"
    }

    fn preview(&self, db: &Database) -> Result<usize> {
        Ok(db.orphaned_postmeta_count()? as usize)
    }

    fn execute(&self, db: &Database) -> Result<usize> {
        let mut deleted = 0;
        loop {
            let ids = db.orphaned_postmeta_ids(self.batch_size)?;
            if ids.is_empty() {
                break;
            }

            let removed = db.delete_postmeta_ids(&ids)?;
            deleted += removed;
            tracing::debug!("Deleted batch of {} orphaned meta rows", removed);

            if ids.len() < self.batch_size || removed == 0 {
                break;
            }
        }
        Ok(deleted)
    }
}
