use super::CleanupOperation;
use crate::db::{Database, POST_TYPE_REVISION};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How many revisions survive a cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionRetention {
    /// Keep the newest `n` revisions of each record
    Keep(usize),
    /// Remove every revision, including those without a parent
    All,
}

impl Default for RevisionRetention {
    fn default() -> Self {
        RevisionRetention::Keep(5)
    }
}

impl From<i64> for RevisionRetention {
    /// Negative values select [`RevisionRetention::All`]
    fn from(keep: i64) -> Self {
        usize::try_from(keep)
            .map(RevisionRetention::Keep)
            .unwrap_or(RevisionRetention::All)
    }
}

/// Removes surplus revisions in batches, oldest first
#[derive(Debug)]
pub struct RevisionCleaner {
    retention: RevisionRetention,
    batch_size: usize,
}

impl RevisionCleaner {
    pub fn new(retention: RevisionRetention, batch_size: usize) -> Self {
        Self {
            retention,
            batch_size: batch_size.max(1),
        }
    }

    pub fn retention(&self) -> RevisionRetention {
        self.retention
    }

    fn next_batch(&self, db: &Database) -> Result<Vec<i64>> {
        match self.retention {
            RevisionRetention::Keep(keep) => db.surplus_revision_ids(keep, self.batch_size),
            RevisionRetention::All => db.revision_ids(self.batch_size),
        }
    }
}

impl Default for RevisionCleaner {
    fn default() -> Self {
        Self::new(RevisionRetention::default(), 500)
    }
}

impl CleanupOperation for RevisionCleaner {
    fn cleanup_type(&self) -> &'static str {
        "revisions"
    }

    fn name(&self) -> &'static str {
        "Post Revisions"
    }

    fn description(&self) -> &'static str {
        "Remove old revisions beyond the retention limit"
    }

    fn preview(&self, db: &Database) -> Result<usize> {
        let count = match self.retention {
            RevisionRetention::Keep(keep) => db.surplus_revision_count(keep)?,
            RevisionRetention::All => db.post_type_count(POST_TYPE_REVISION)?,
        };
        Ok(count as usize)
    }

    fn execute(&self, db: &Database) -> Result<usize> {
        let mut deleted = 0;
        loop {
            let ids = self.next_batch(db)?;
            if ids.is_empty() {
                break;
            }

            let mut removed = 0;
            for id in &ids {
                if db.delete_revision(*id)? {
                    removed += 1;
                }
            }
            deleted += removed;
            tracing::debug!("Deleted batch of {} revisions", removed);

            if ids.len() < self.batch_size || removed == 0 {
                break;
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewPost;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn add_revisions(db: &Database, parent: i64, n: usize) -> Vec<i64> {
        (0..n)
            .map(|i| {
                let post = NewPost::new(POST_TYPE_REVISION, "rev")
                    .with_parent(parent)
                    .with_status("inherit")
                    .with_date(&format!("2024-02-{:02} 12:00:00", i + 1));
                db.insert_post(&post).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_retention_from_keep() {
        assert_eq!(RevisionRetention::from(5), RevisionRetention::Keep(5));
        assert_eq!(RevisionRetention::from(0), RevisionRetention::Keep(0));
        assert_eq!(RevisionRetention::from(-1), RevisionRetention::All);
    }

    #[test]
    fn test_keeps_newest_five() {
        let db = setup();
        let post = db.insert_post(&NewPost::new("post", "Hello")).unwrap();
        let revisions = add_revisions(&db, post, 8);
        for id in &revisions {
            db.insert_post_meta(*id, "_rev_meta", "x").unwrap();
        }

        let cleaner = RevisionCleaner::new(RevisionRetention::Keep(5), 2);
        assert_eq!(cleaner.preview(&db).unwrap(), 3);
        assert_eq!(cleaner.execute(&db).unwrap(), 3);
        assert_eq!(cleaner.preview(&db).unwrap(), 0);

        for id in &revisions[..3] {
            assert!(!db.post_exists(*id).unwrap());
        }
        for id in &revisions[3..] {
            assert!(db.post_exists(*id).unwrap());
        }
        assert_eq!(db.postmeta_count().unwrap(), 5);
    }

    #[test]
    fn test_keep_zero_and_per_parent() {
        let db = setup();
        let a = db.insert_post(&NewPost::new("post", "A")).unwrap();
        let b = db.insert_post(&NewPost::new("post", "B")).unwrap();
        add_revisions(&db, a, 3);
        add_revisions(&db, b, 1);

        let keep_one = RevisionCleaner::new(RevisionRetention::Keep(1), 500);
        assert_eq!(keep_one.preview(&db).unwrap(), 2);

        let keep_none = RevisionCleaner::new(RevisionRetention::Keep(0), 500);
        assert_eq!(keep_none.preview(&db).unwrap(), 4);
        assert_eq!(keep_none.execute(&db).unwrap(), 4);
        assert_eq!(db.post_type_count(POST_TYPE_REVISION).unwrap(), 0);
    }

    #[test]
    fn test_delete_all_includes_parentless() {
        let db = setup();
        let post = db.insert_post(&NewPost::new("post", "A")).unwrap();
        add_revisions(&db, post, 2);
        add_revisions(&db, 0, 1);

        let keep_none = RevisionCleaner::new(RevisionRetention::Keep(0), 500);
        assert_eq!(keep_none.preview(&db).unwrap(), 2);

        let all = RevisionCleaner::new(RevisionRetention::All, 500);
        assert_eq!(all.preview(&db).unwrap(), 3);
        assert_eq!(all.execute(&db).unwrap(), 3);
        assert_eq!(all.preview(&db).unwrap(), 0);
    }
}
