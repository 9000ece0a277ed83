use super::CleanupOperation;
use crate::db::Database;
use crate::error::Result;
use chrono::Utc;

/// Removes expired customer sessions; a store without the session table has none
#[derive(Debug, Default)]
pub struct SessionCleaner;

impl SessionCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl CleanupOperation for SessionCleaner {
    fn cleanup_type(&self) -> &'static str {
        "sessions"
    }

    fn name(&self) -> &'static str {
        "Expired Sessions"
    }

    fn description(&self) -> &'static str {
        "Remove customer sessions past their expiry"
    }

    fn preview(&self, db: &Database) -> Result<usize> {
        let count = db.expired_session_count(Utc::now().timestamp())?;
        Ok(count as usize)
    }

    fn execute(&self, db: &Database) -> Result<usize> {
        db.delete_expired_sessions(Utc::now().timestamp())
    }
}
