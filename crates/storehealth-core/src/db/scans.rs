//! Scan persistence: the single last-scan record and the metric time series

use super::{sql_int, Database};
use crate::error::Result;
use crate::scanner::ScanResult;
use chrono::{DateTime, Utc};
use rusqlite::params;

/// One stored metric value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricSnapshot {
    pub metric_key: String,
    pub metric_value: i64,
    pub snapshot_type: String,
    pub created_at: String,
}

impl Database {
    /// Replace the last scan record
    pub fn store_last_scan(&self, result: &ScanResult) -> Result<()> {
        let json = serde_json::to_string(result)?;
        self.conn.execute(
            "INSERT INTO health_scans (id, result, scanned_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                result = excluded.result,
                scanned_at = excluded.scanned_at",
            params![json, result.scanned_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Replace the last scan record and append its snapshot in one transaction
    ///
    /// On failure neither write is kept.
    pub fn record_scan(
        &self,
        result: &ScanResult,
        values: &[(&str, i64)],
        snapshot_type: &str,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        self.store_last_scan(result)?;
        let inserted = self.insert_snapshot(values, snapshot_type)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// Load the last scan record, if any
    ///
    /// A record that no longer deserializes is treated as absent.
    pub fn last_scan(&self) -> Result<Option<ScanResult>> {
        let json: Option<String> = match self.conn.query_row(
            "SELECT result FROM health_scans WHERE id = 1",
            [],
            |row| row.get(0),
        ) {
            Ok(json) => Some(json),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let Some(json) = json else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable scan record: {}", e);
                Ok(None)
            }
        }
    }

    /// Delete the last scan record
    pub fn clear_last_scan(&self) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM health_scans", [])?;
        Ok(rows > 0)
    }

    /// Append one row per metric, all sharing a timestamp
    pub fn insert_snapshot(&self, values: &[(&str, i64)], snapshot_type: &str) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare(
            "INSERT INTO metrics_snapshots (metric_key, metric_value, snapshot_type, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        let mut inserted = 0;
        for (key, value) in values {
            inserted += stmt.execute(params![key, value, snapshot_type, now])?;
        }
        Ok(inserted)
    }

    /// Stored values of one metric, newest first
    pub fn metric_history(&self, metric_key: &str, limit: usize) -> Result<Vec<MetricSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT metric_key, metric_value, snapshot_type, created_at
             FROM metrics_snapshots
             WHERE metric_key = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;

        let results = stmt
            .query_map(params![metric_key, sql_int(limit)], |row| {
                Ok(MetricSnapshot {
                    metric_key: row.get(0)?,
                    metric_value: row.get(1)?,
                    snapshot_type: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Delete snapshots recorded before `cutoff`
    pub fn prune_snapshots(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM metrics_snapshots WHERE created_at < ?1",
            params![cutoff.to_rfc3339()],
        )?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_snapshot_history_newest_first() {
        let db = setup();
        db.insert_snapshot(&[("autoload_size", 100), ("postmeta_rows", 5)], "scan")
            .unwrap();
        db.insert_snapshot(&[("autoload_size", 200)], "scan").unwrap();

        let history = db.metric_history("autoload_size", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].metric_value, 200);
        assert_eq!(history[1].metric_value, 100);
        assert_eq!(history[0].snapshot_type, "scan");

        assert_eq!(db.metric_history("autoload_size", 1).unwrap().len(), 1);
        assert!(db.metric_history("unknown", 10).unwrap().is_empty());
    }

    #[test]
    fn test_prune_snapshots() {
        let db = setup();
        db.insert_snapshot(&[("autoload_size", 1)], "scan").unwrap();

        let pruned = db.prune_snapshots(Utc::now() - Duration::days(1)).unwrap();
        assert_eq!(pruned, 0);

        let pruned = db.prune_snapshots(Utc::now() + Duration::days(1)).unwrap();
        assert_eq!(pruned, 1);
    }

    fn scan_with_score(health_score: u32) -> ScanResult {
        let calc = crate::scanner::ScoreCalculator::default();
        let metrics = crate::scanner::MetricSet::default();
        let card = calc.calculate(&metrics);
        ScanResult {
            scanned_at: Utc::now(),
            health_score,
            score_label: card.label,
            score_color: card.color,
            metrics,
            breakdown: card.breakdown,
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_record_scan_is_atomic() {
        let db = setup();
        db.record_scan(&scan_with_score(90), &[("autoload_size", 1)], "scan")
            .unwrap();
        assert_eq!(db.metric_history("autoload_size", 10).unwrap().len(), 1);

        db.conn.execute("DROP TABLE metrics_snapshots", []).unwrap();
        assert!(db
            .record_scan(&scan_with_score(10), &[("autoload_size", 2)], "scan")
            .is_err());

        let stored = db.last_scan().unwrap().unwrap();
        assert_eq!(stored.health_score, 90);
    }

    #[test]
    fn test_last_scan_absent() {
        let db = setup();
        assert!(db.last_scan().unwrap().is_none());
        assert!(!db.clear_last_scan().unwrap());
    }

    #[test]
    fn test_corrupt_scan_record_reads_as_absent() {
        let db = setup();
        db.conn
            .execute(
                "INSERT INTO health_scans (id, result, scanned_at) VALUES (1, 'not json', 'now')",
                [],
            )
            .unwrap();
        assert!(db.last_scan().unwrap().is_none());
    }
}
