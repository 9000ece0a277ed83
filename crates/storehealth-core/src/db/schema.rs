//! Database schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 2;

const CREATE_TABLES: &str = r#"
-- Site options (key-value configuration, some eagerly autoloaded)
CREATE TABLE IF NOT EXISTS options (
    option_id INTEGER PRIMARY KEY AUTOINCREMENT,
    option_name TEXT NOT NULL UNIQUE,
    option_value TEXT NOT NULL DEFAULT '',
    autoload TEXT NOT NULL DEFAULT 'yes'
);

-- Records (posts, products, variations, revisions, orders)
CREATE TABLE IF NOT EXISTS posts (
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    post_title TEXT NOT NULL DEFAULT '',
    post_type TEXT NOT NULL DEFAULT 'post',
    post_status TEXT NOT NULL DEFAULT 'publish',
    post_parent INTEGER NOT NULL DEFAULT 0,
    post_date TEXT NOT NULL
);

-- Record metadata (intentionally without a foreign key: orphans are what we measure)
CREATE TABLE IF NOT EXISTS postmeta (
    meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL DEFAULT 0,
    meta_key TEXT,
    meta_value TEXT
);

-- Taxonomy relationships owned by records
CREATE TABLE IF NOT EXISTS term_relationships (
    object_id INTEGER NOT NULL,
    term_taxonomy_id INTEGER NOT NULL,
    PRIMARY KEY (object_id, term_taxonomy_id)
);

-- Comments owned by records
CREATE TABLE IF NOT EXISTS comments (
    comment_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    comment_post_ID INTEGER NOT NULL DEFAULT 0,
    comment_content TEXT NOT NULL DEFAULT '',
    comment_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS commentmeta (
    meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
    comment_id INTEGER NOT NULL DEFAULT 0,
    meta_key TEXT,
    meta_value TEXT
);

-- Last health scan (single row, overwritten by every scan)
CREATE TABLE IF NOT EXISTS health_scans (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    result TEXT NOT NULL,
    scanned_at TEXT NOT NULL
);

-- Metric time series (append-only)
CREATE TABLE IF NOT EXISTS metrics_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metric_key TEXT NOT NULL,
    metric_value INTEGER NOT NULL DEFAULT 0,
    snapshot_type TEXT NOT NULL DEFAULT 'manual',
    created_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_options_autoload ON options(autoload);
CREATE INDEX IF NOT EXISTS idx_posts_type_status ON posts(post_type, post_status);
CREATE INDEX IF NOT EXISTS idx_posts_parent ON posts(post_parent);
CREATE INDEX IF NOT EXISTS idx_postmeta_post_id ON postmeta(post_id);
CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(comment_post_ID);
CREATE INDEX IF NOT EXISTS idx_snapshots_metric_key ON metrics_snapshots(metric_key);
CREATE INDEX IF NOT EXISTS idx_snapshots_created_at ON metrics_snapshots(created_at);
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    ///
    /// Optional store structures (customer sessions, HPOS orders) are not
    /// created here; see [`Database::create_sessions_table`] and
    /// [`Database::create_orders_table`].
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        // Run migrations to upgrade existing databases (BEFORE setting version)
        self.migrate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    /// Run migrations to upgrade schema to current version
    pub fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?.unwrap_or(0);

        if current < 2 {
            self.migrate_to_v2()?;
        }

        Ok(())
    }

    fn migrate_to_v2(&self) -> Result<()> {
        // v1 stores recorded snapshots without a type
        let has_snapshot_type: bool = self
            .conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('metrics_snapshots') WHERE name = 'snapshot_type'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_snapshot_type {
            self.conn.execute(
                "ALTER TABLE metrics_snapshots ADD COLUMN snapshot_type TEXT NOT NULL DEFAULT 'manual'",
                [],
            )?;
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![2],
        )?;

        Ok(())
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
