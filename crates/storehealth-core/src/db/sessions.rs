//! Customer session table (optional; absent on stores without a cart)

use super::Database;
use crate::error::Result;
use rusqlite::params;

/// Name of the optional session table
pub const SESSIONS_TABLE: &str = "woocommerce_sessions";

impl Database {
    /// Create the session table
    pub fn create_sessions_table(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS woocommerce_sessions (
                session_id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_key TEXT NOT NULL UNIQUE,
                session_value TEXT NOT NULL DEFAULT '',
                session_expiry INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON woocommerce_sessions(session_expiry);",
        )?;
        Ok(())
    }

    /// Whether the session table exists
    pub fn has_sessions_table(&self) -> Result<bool> {
        self.table_exists(SESSIONS_TABLE)
    }

    /// Insert or refresh a session
    pub fn upsert_session(&self, key: &str, value: &str, expiry: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO woocommerce_sessions (session_key, session_value, session_expiry)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(session_key) DO UPDATE SET
                session_value = excluded.session_value,
                session_expiry = excluded.session_expiry",
            params![key, value, expiry],
        )?;
        Ok(())
    }

    /// Number of sessions, 0 when the table is absent
    pub fn session_count(&self) -> Result<i64> {
        if !self.has_sessions_table()? {
            return Ok(0);
        }
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM woocommerce_sessions", [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Number of sessions expired before `now`, 0 when the table is absent
    pub fn expired_session_count(&self, now: i64) -> Result<i64> {
        if !self.has_sessions_table()? {
            return Ok(0);
        }
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM woocommerce_sessions WHERE session_expiry < ?1",
            params![now],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete sessions expired before `now`, 0 when the table is absent
    pub fn delete_expired_sessions(&self, now: i64) -> Result<usize> {
        if !self.has_sessions_table()? {
            return Ok(0);
        }
        let deleted = self.conn.execute(
            "DELETE FROM woocommerce_sessions WHERE session_expiry < ?1",
            params![now],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_counts_zero() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        assert!(!db.has_sessions_table().unwrap());
        assert_eq!(db.session_count().unwrap(), 0);
        assert_eq!(db.expired_session_count(i64::MAX).unwrap(), 0);
        assert_eq!(db.delete_expired_sessions(i64::MAX).unwrap(), 0);
    }

    #[test]
    fn test_session_expiry() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.create_sessions_table().unwrap();

        db.upsert_session("a", "{}", 100).unwrap();
        db.upsert_session("b", "{}", 200).unwrap();
        db.upsert_session("c", "{}", 900).unwrap();

        assert_eq!(db.session_count().unwrap(), 3);
        assert_eq!(db.expired_session_count(500).unwrap(), 2);
        assert_eq!(db.delete_expired_sessions(500).unwrap(), 2);
        assert_eq!(db.session_count().unwrap(), 1);
    }
}
