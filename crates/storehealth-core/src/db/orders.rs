//! Order counting across both storage layouts

use super::posts::POST_TYPE_SHOP_ORDER;
use super::Database;
use crate::config::OrderStorage;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

/// Name of the high-performance order table
pub const ORDERS_TABLE: &str = "wc_orders";

impl Database {
    /// Create the high-performance order table
    pub fn create_orders_table(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS wc_orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                status TEXT NOT NULL DEFAULT 'wc-pending',
                date_created TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert an order into the high-performance table
    pub fn insert_order(&self, status: &str) -> Result<i64> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.conn.execute(
            "INSERT INTO wc_orders (status, date_created) VALUES (?1, ?2)",
            params![status, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Count orders in whichever layout the store uses
    pub fn order_count(&self, storage: OrderStorage) -> Result<i64> {
        match storage {
            OrderStorage::Posts => self.post_type_count(POST_TYPE_SHOP_ORDER),
            OrderStorage::Hpos => {
                if !self.table_exists(ORDERS_TABLE)? {
                    return Ok(0);
                }
                let count: i64 =
                    self.conn
                        .query_row("SELECT COUNT(*) FROM wc_orders", [], |row| row.get(0))?;
                Ok(count)
            }
        }
    }
}
