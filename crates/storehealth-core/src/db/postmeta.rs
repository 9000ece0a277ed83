//! Record metadata queries

use super::{sql_int, Database};
use crate::error::Result;
use rusqlite::{params, params_from_iter};

impl Database {
    /// Add a metadata row, returning its ID
    pub fn insert_post_meta(&self, post_id: i64, key: &str, value: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO postmeta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![post_id, key, value],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete every metadata row of a record
    pub fn delete_post_meta(&self, post_id: i64) -> Result<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM postmeta WHERE post_id = ?1", params![post_id])?;
        Ok(rows)
    }

    /// Total metadata rows
    pub fn postmeta_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM postmeta", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Metadata rows whose record no longer exists
    pub fn orphaned_postmeta_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM postmeta pm
             LEFT JOIN posts p ON pm.post_id = p.ID
             WHERE p.ID IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Up to `limit` orphaned metadata IDs
    pub fn orphaned_postmeta_ids(&self, limit: usize) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT pm.meta_id FROM postmeta pm
             LEFT JOIN posts p ON pm.post_id = p.ID
             WHERE p.ID IS NULL
             ORDER BY pm.meta_id
             LIMIT ?1",
        )?;
        let ids = stmt
            .query_map(params![sql_int(limit)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Delete metadata rows by ID
    pub fn delete_postmeta_ids(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("DELETE FROM postmeta WHERE meta_id IN ({})", placeholders);
        let rows = self.conn.execute(&sql, params_from_iter(ids.iter()))?;
        Ok(rows)
    }

    /// Metadata rows attached to products
    pub fn product_meta_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM postmeta pm
             INNER JOIN posts p ON pm.post_id = p.ID
             WHERE p.post_type = 'product'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
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

    #[test]
    fn test_orphaned_postmeta() {
        let db = setup();
        let live = db.insert_post(&NewPost::new("post", "live")).unwrap();
        db.insert_post_meta(live, "k", "v").unwrap();
        let orphan_a = db.insert_post_meta(9001, "k", "v").unwrap();
        let orphan_b = db.insert_post_meta(9002, "k", "v").unwrap();

        assert_eq!(db.postmeta_count().unwrap(), 3);
        assert_eq!(db.orphaned_postmeta_count().unwrap(), 2);
        assert_eq!(
            db.orphaned_postmeta_ids(10).unwrap(),
            vec![orphan_a, orphan_b]
        );
        assert_eq!(db.orphaned_postmeta_ids(1).unwrap(), vec![orphan_a]);
    }

    #[test]
    fn test_delete_postmeta_ids() {
        let db = setup();
        let a = db.insert_post_meta(1, "k", "v").unwrap();
        let b = db.insert_post_meta(2, "k", "v").unwrap();
        db.insert_post_meta(3, "k", "v").unwrap();

        assert_eq!(db.delete_postmeta_ids(&[a, b]).unwrap(), 2);
        assert_eq!(db.delete_postmeta_ids(&[]).unwrap(), 0);
        assert_eq!(db.postmeta_count().unwrap(), 1);
    }

    #[test]
    fn test_product_meta_count() {
        let db = setup();
        let product = db.insert_post(&NewPost::new("product", "Shirt")).unwrap();
        let post = db.insert_post(&NewPost::new("post", "Blog")).unwrap();
        for i in 0..3 {
            db.insert_post_meta(product, &format!("_k{}", i), "v").unwrap();
        }
        db.insert_post_meta(post, "_k", "v").unwrap();

        assert_eq!(db.product_meta_count().unwrap(), 3);
    }
}
