//! Option table queries: autoload sizing and transients

use super::{sql_int, Database};
use crate::error::Result;
use rusqlite::params;

/// Prefix of a transient's value row
pub const TRANSIENT_PREFIX: &str = "_transient_";

/// Prefix of a transient's expiry row
pub const TRANSIENT_TIMEOUT_PREFIX: &str = "_transient_timeout_";

// LIKE patterns with `_` escaped so it matches literally
const TRANSIENT_LIKE: &str = r"\_transient\_%";
const TRANSIENT_TIMEOUT_LIKE: &str = r"\_transient\_timeout\_%";

/// An autoloaded option and the byte length of its value
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AutoloadedOption {
    pub name: String,
    pub size: i64,
}

impl Database {
    /// Insert or replace an option
    pub fn set_option(&self, name: &str, value: &str, autoload: bool) -> Result<()> {
        let autoload = if autoload { "yes" } else { "no" };
        self.conn.execute(
            "INSERT INTO options (option_name, option_value, autoload) VALUES (?1, ?2, ?3)
             ON CONFLICT(option_name) DO UPDATE SET
                option_value = excluded.option_value,
                autoload = excluded.autoload",
            params![name, value, autoload],
        )?;
        Ok(())
    }

    /// Get an option value
    pub fn get_option(&self, name: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT option_value FROM options WHERE option_name = ?1",
            params![name],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an option by name, returning rows removed
    pub fn delete_option(&self, name: &str) -> Result<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM options WHERE option_name = ?1", params![name])?;
        Ok(rows)
    }

    /// Store a transient as a value row plus a timeout row (not autoloaded)
    pub fn set_transient(&self, key: &str, value: &str, expires_at: i64) -> Result<()> {
        self.set_option(&format!("{}{}", TRANSIENT_PREFIX, key), value, false)?;
        self.set_option(
            &format!("{}{}", TRANSIENT_TIMEOUT_PREFIX, key),
            &expires_at.to_string(),
            false,
        )?;
        Ok(())
    }

    /// Total byte size of autoloaded option values
    pub fn autoload_size(&self) -> Result<i64> {
        let size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(option_value AS BLOB))), 0) FROM options WHERE autoload = 'yes'",
            [],
            |row| row.get(0),
        )?;
        Ok(size)
    }

    /// Number of autoloaded options
    pub fn autoload_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM options WHERE autoload = 'yes'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of options
    pub fn option_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM options", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of transient value rows (timeouts excluded)
    pub fn transient_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM options
             WHERE option_name LIKE ?1 ESCAPE '\\'
             AND option_name NOT LIKE ?2 ESCAPE '\\'",
            params![TRANSIENT_LIKE, TRANSIENT_TIMEOUT_LIKE],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of transient timeout rows whose expiry is before `now`
    pub fn expired_transient_count(&self, now: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM options
             WHERE option_name LIKE ?1 ESCAPE '\\'
             AND CAST(option_value AS INTEGER) < ?2",
            params![TRANSIENT_TIMEOUT_LIKE, now],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Names of transient timeout rows whose expiry is before `now`
    pub fn expired_transient_timeouts(&self, now: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT option_name FROM options
             WHERE option_name LIKE ?1 ESCAPE '\\'
             AND CAST(option_value AS INTEGER) < ?2
             ORDER BY option_id",
        )?;

        let names = stmt
            .query_map(params![TRANSIENT_TIMEOUT_LIKE, now], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Largest autoloaded options, descending by value size (ties by name)
    pub fn top_autoloaded_options(&self, limit: usize) -> Result<Vec<AutoloadedOption>> {
        let mut stmt = self.conn.prepare(
            "SELECT option_name, LENGTH(CAST(option_value AS BLOB)) AS size
             FROM options
             WHERE autoload = 'yes'
             ORDER BY size DESC, option_name ASC
             LIMIT ?1",
        )?;

        let results = stmt
            .query_map(params![sql_int(limit)], |row| {
                Ok(AutoloadedOption {
                    name: row.get(0)?,
                    size: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_autoload_size_and_count() {
        let db = setup();
        db.set_option("siteurl", "https://example.com", true).unwrap();
        db.set_option("big_blob", &"x".repeat(1000), true).unwrap();
        db.set_option("lazy", &"y".repeat(5000), false).unwrap();

        assert_eq!(db.autoload_size().unwrap(), 19 + 1000);
        assert_eq!(db.autoload_count().unwrap(), 2);
        assert_eq!(db.option_count().unwrap(), 3);
    }

    #[test]
    fn test_autoload_size_counts_bytes() {
        let db = setup();
        db.set_option("multibyte", &"é".repeat(10), true).unwrap();

        assert_eq!(db.autoload_size().unwrap(), 20);
        let top = db.top_autoloaded_options(usize::MAX).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].size, 20);
    }

    #[test]
    fn test_autoload_size_empty_is_zero() {
        let db = setup();
        assert_eq!(db.autoload_size().unwrap(), 0);
    }

    #[test]
    fn test_set_option_overwrites() {
        let db = setup();
        db.set_option("color", "red", true).unwrap();
        db.set_option("color", "blue", false).unwrap();
        assert_eq!(db.get_option("color").unwrap().as_deref(), Some("blue"));
        assert_eq!(db.autoload_count().unwrap(), 0);
    }

    #[test]
    fn test_transient_counts() {
        let db = setup();
        db.set_transient("a", "1", 100).unwrap();
        db.set_transient("b", "2", 200).unwrap();
        db.set_transient("c", "3", 10_000).unwrap();
        // Underscore must not act as a wildcard
        db.set_option("xtransientxfoo", "nope", false).unwrap();

        assert_eq!(db.transient_count().unwrap(), 3);
        assert_eq!(db.expired_transient_count(500).unwrap(), 2);
        assert_eq!(
            db.expired_transient_timeouts(500).unwrap(),
            vec!["_transient_timeout_a", "_transient_timeout_b"]
        );
    }

    #[test]
    fn test_top_autoloaded_order_and_limit() {
        let db = setup();
        db.set_option("small", "ab", true).unwrap();
        db.set_option("large", &"z".repeat(50), true).unwrap();
        db.set_option("medium_b", &"m".repeat(10), true).unwrap();
        db.set_option("medium_a", &"m".repeat(10), true).unwrap();
        db.set_option("hidden", &"h".repeat(500), false).unwrap();

        let top = db.top_autoloaded_options(3).unwrap();
        let names: Vec<&str> = top.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["large", "medium_a", "medium_b"]);
        assert_eq!(top[0].size, 50);
    }
}
