use super::CleanupOperation;
use crate::db::Database;
use crate::error::Result;

/// Permanently deletes trashed records with everything they own
#[derive(Debug, Default)]
pub struct TrashCleaner;

impl TrashCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl CleanupOperation for TrashCleaner {
    fn cleanup_type(&self) -> &'static str {
        "trash"
    }

    fn name(&self) -> &'static str {
        "Trashed Posts"
    }

    fn description(&self) -> &'static str {
        "Permanently delete trashed records and their metadata, comments and revisions"
    }

    fn preview(&self, db: &Database) -> Result<usize> {
        Ok(db.trashed_post_count()? as usize)
    }

    /// Records that failed to delete are skipped and left in the trash
    fn execute(&self, db: &Database) -> Result<usize> {
        let mut deleted = 0;
        for id in db.trashed_post_ids()? {
            match db.delete_post(id) {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Skipping trashed record {}: {}", id, e),
            }
        }
        Ok(deleted)
    }
}
