//! Record queries: revisions, trash, products and the cascading delete

use super::{sql_int, Database};
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

pub const POST_TYPE_REVISION: &str = "revision";
pub const POST_TYPE_PRODUCT: &str = "product";
pub const POST_TYPE_VARIATION: &str = "product_variation";
pub const POST_TYPE_SHOP_ORDER: &str = "shop_order";
pub const POST_STATUS_TRASH: &str = "trash";

/// Record to insert
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub post_type: String,
    pub status: String,
    pub parent: i64,
    /// `YYYY-MM-DD HH:MM:SS`, sorts lexically
    pub date: String,
}

impl NewPost {
    /// Create a published post of the given type dated now
    pub fn new(post_type: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            post_type: post_type.to_string(),
            status: "publish".to_string(),
            parent: 0,
            date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn with_parent(mut self, parent: i64) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }
}

/// A product and how many variations hang off it
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariationGroup {
    pub id: i64,
    pub title: String,
    pub variation_count: i64,
}

const SURPLUS_REVISIONS: &str = "
    SELECT ID, post_date FROM (
        SELECT ID, post_date,
               ROW_NUMBER() OVER (
                   PARTITION BY post_parent ORDER BY post_date DESC, ID DESC
               ) AS rn
        FROM posts
        WHERE post_type = 'revision' AND post_parent > 0
    )
    WHERE rn > ?1";

impl Database {
    /// Insert a record, returning its ID
    pub fn insert_post(&self, post: &NewPost) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (post_title, post_type, post_status, post_parent, post_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![post.title, post.post_type, post.status, post.parent, post.date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Check whether a record exists
    pub fn post_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM posts WHERE ID = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Attach a record to a taxonomy term
    pub fn add_term_relationship(&self, object_id: i64, term_taxonomy_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO term_relationships (object_id, term_taxonomy_id) VALUES (?1, ?2)",
            params![object_id, term_taxonomy_id],
        )?;
        Ok(())
    }

    /// Add a comment to a record, returning its ID
    pub fn insert_comment(&self, post_id: i64, content: &str) -> Result<i64> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.conn.execute(
            "INSERT INTO comments (comment_post_ID, comment_content, comment_date) VALUES (?1, ?2, ?3)",
            params![post_id, content, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Records that count as content (no revisions, menu items, auto-drafts or trash)
    pub fn content_post_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts
             WHERE post_type NOT IN ('revision', 'auto-draft', 'nav_menu_item')
             AND post_status != 'trash'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count records of one type
    pub fn post_type_count(&self, post_type: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE post_type = ?1",
            params![post_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count live products (published, draft or private)
    pub fn product_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts
             WHERE post_type = ?1
             AND post_status IN ('publish', 'draft', 'private')",
            params![POST_TYPE_PRODUCT],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count trashed records
    pub fn trashed_post_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE post_status = ?1",
            params![POST_STATUS_TRASH],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// IDs of trashed records
    pub fn trashed_post_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ID FROM posts WHERE post_status = ?1 ORDER BY ID")?;
        let ids = stmt
            .query_map(params![POST_STATUS_TRASH], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Revisions beyond the newest `keep` per parent
    pub fn surplus_revision_count(&self, keep: usize) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM ({})", SURPLUS_REVISIONS),
            params![sql_int(keep)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Up to `limit` surplus revision IDs, oldest first
    pub fn surplus_revision_ids(&self, keep: usize, limit: usize) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT ID FROM ({}) ORDER BY post_date ASC, ID ASC LIMIT ?2",
            SURPLUS_REVISIONS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params![sql_int(keep), sql_int(limit)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Up to `limit` revision IDs of any parent, oldest first
    pub fn revision_ids(&self, limit: usize) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT ID FROM posts WHERE post_type = ?1
             ORDER BY post_date ASC, ID ASC LIMIT ?2",
        )?;
        let ids = stmt
            .query_map(params![POST_TYPE_REVISION, sql_int(limit)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Delete a revision and its metadata, returning whether the revision row went away
    pub fn delete_revision(&self, id: i64) -> Result<bool> {
        self.delete_post_meta(id)?;
        let rows = self.conn.execute(
            "DELETE FROM posts WHERE ID = ?1 AND post_type = ?2",
            params![id, POST_TYPE_REVISION],
        )?;
        Ok(rows > 0)
    }

    /// Fully delete a record and everything it owns
    ///
    /// Removes the record's metadata, term relationships, comments (with
    /// their metadata) and revisions, and re-parents any other children to
    /// the record's own parent. Returns `false` if the record did not exist.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        let parent: Option<i64> = self
            .conn
            .query_row(
                "SELECT post_parent FROM posts WHERE ID = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(parent) = parent else {
            return Ok(false);
        };

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM postmeta WHERE post_id IN
             (SELECT ID FROM posts WHERE post_parent = ?1 AND post_type = ?2)",
            params![id, POST_TYPE_REVISION],
        )?;
        tx.execute(
            "DELETE FROM posts WHERE post_parent = ?1 AND post_type = ?2",
            params![id, POST_TYPE_REVISION],
        )?;
        tx.execute(
            "UPDATE posts SET post_parent = ?2 WHERE post_parent = ?1",
            params![id, parent],
        )?;
        tx.execute("DELETE FROM postmeta WHERE post_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM term_relationships WHERE object_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM commentmeta WHERE comment_id IN
             (SELECT comment_ID FROM comments WHERE comment_post_ID = ?1)",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM comments WHERE comment_post_ID = ?1",
            params![id],
        )?;
        let rows = tx.execute("DELETE FROM posts WHERE ID = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    /// Products with at least `threshold` variations, most variations first
    pub fn high_variation_products(
        &self,
        threshold: usize,
        limit: usize,
    ) -> Result<Vec<VariationGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.ID, p.post_title, COUNT(v.ID) AS variation_count
             FROM posts p
             INNER JOIN posts v ON v.post_parent = p.ID
             WHERE p.post_type = ?1
             AND v.post_type = ?2
             GROUP BY p.ID, p.post_title
             HAVING COUNT(v.ID) >= ?3
             ORDER BY variation_count DESC, p.ID ASC
             LIMIT ?4",
        )?;

        let results = stmt
            .query_map(
                params![
                    POST_TYPE_PRODUCT,
                    POST_TYPE_VARIATION,
                    sql_int(threshold),
                    sql_int(limit)
                ],
                |row| {
                    Ok(VariationGroup {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        variation_count: row.get(2)?,
                    })
                },
            )?
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

    fn add_revisions(db: &Database, parent: i64, n: usize) -> Vec<i64> {
        (0..n)
            .map(|i| {
                let post = NewPost::new(POST_TYPE_REVISION, "rev")
                    .with_parent(parent)
                    .with_status("inherit")
                    .with_date(&format!("2024-01-{:02} 00:00:00", i + 1));
                db.insert_post(&post).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_content_post_count_excludes_noise() {
        let db = setup();
        db.insert_post(&NewPost::new("post", "a")).unwrap();
        db.insert_post(&NewPost::new("page", "b")).unwrap();
        db.insert_post(&NewPost::new("post", "c").with_status("trash"))
            .unwrap();
        db.insert_post(&NewPost::new("nav_menu_item", "d")).unwrap();
        db.insert_post(&NewPost::new("auto-draft", "e")).unwrap();
        db.insert_post(&NewPost::new("post", "f").with_status("auto-draft"))
            .unwrap();
        add_revisions(&db, 1, 2);

        assert_eq!(db.content_post_count().unwrap(), 3);
        assert_eq!(db.trashed_post_count().unwrap(), 1);
        assert_eq!(db.post_type_count(POST_TYPE_REVISION).unwrap(), 2);
    }

    #[test]
    fn test_surplus_revisions_keep_newest() {
        let db = setup();
        let parent = db.insert_post(&NewPost::new("post", "p")).unwrap();
        let revs = add_revisions(&db, parent, 8);

        assert_eq!(db.surplus_revision_count(5).unwrap(), 3);
        assert_eq!(db.surplus_revision_ids(5, 100).unwrap(), revs[..3].to_vec());
        assert_eq!(db.surplus_revision_ids(5, 2).unwrap(), revs[..2].to_vec());
        assert_eq!(db.surplus_revision_count(0).unwrap(), 8);
        assert_eq!(db.surplus_revision_count(20).unwrap(), 0);
    }

    #[test]
    fn test_surplus_revisions_ignore_parentless() {
        let db = setup();
        add_revisions(&db, 0, 4);
        assert_eq!(db.surplus_revision_count(0).unwrap(), 0);
        assert_eq!(db.revision_ids(10).unwrap().len(), 4);
    }

    #[test]
    fn test_delete_post_cascades() {
        let db = setup();
        let id = db
            .insert_post(&NewPost::new("post", "gone").with_status("trash"))
            .unwrap();
        let child = db
            .insert_post(&NewPost::new("attachment", "img").with_parent(id))
            .unwrap();
        let revs = add_revisions(&db, id, 2);
        db.insert_post_meta(id, "_edit_lock", "1").unwrap();
        db.insert_post_meta(revs[0], "_rev_meta", "1").unwrap();
        db.add_term_relationship(id, 7).unwrap();
        db.insert_comment(id, "nice").unwrap();

        assert!(db.delete_post(id).unwrap());
        assert!(!db.post_exists(id).unwrap());
        assert!(!db.post_exists(revs[0]).unwrap());
        assert!(db.post_exists(child).unwrap());
        assert_eq!(db.postmeta_count().unwrap(), 0);

        let rels: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM term_relationships", [], |r| r.get(0))
            .unwrap();
        let comments: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rels, 0);
        assert_eq!(comments, 0);
    }

    #[test]
    fn test_delete_missing_post() {
        let db = setup();
        assert!(!db.delete_post(999).unwrap());
    }

    #[test]
    fn test_high_variation_products() {
        let db = setup();
        let big = db.insert_post(&NewPost::new(POST_TYPE_PRODUCT, "Big")).unwrap();
        let small = db
            .insert_post(&NewPost::new(POST_TYPE_PRODUCT, "Small"))
            .unwrap();
        for _ in 0..5 {
            db.insert_post(&NewPost::new(POST_TYPE_VARIATION, "v").with_parent(big))
                .unwrap();
        }
        for _ in 0..2 {
            db.insert_post(&NewPost::new(POST_TYPE_VARIATION, "v").with_parent(small))
                .unwrap();
        }

        let groups = db.high_variation_products(2, 10).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, big);
        assert_eq!(groups[0].variation_count, 5);

        let groups = db.high_variation_products(3, 10).unwrap();
        assert_eq!(groups.len(), 1);

        let groups = db.high_variation_products(1, 1).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "Big");

        assert!(db.high_variation_products(usize::MAX, 10).unwrap().is_empty());
        assert_eq!(db.high_variation_products(1, usize::MAX).unwrap().len(), 2);
    }

    #[test]
    fn test_huge_keep_leaves_every_revision() {
        let db = setup();
        let parent = db.insert_post(&NewPost::new("post", "p")).unwrap();
        add_revisions(&db, parent, 3);

        assert_eq!(db.surplus_revision_count(usize::MAX).unwrap(), 0);
        assert!(db.surplus_revision_ids(usize::MAX, 10).unwrap().is_empty());
        assert_eq!(db.revision_ids(usize::MAX).unwrap().len(), 3);
    }
}
