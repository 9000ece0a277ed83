//! Health scanning
//!
//! Collects metrics, scores them, and persists the result:
//! - [`MetricsCollector`] runs the read-only aggregate queries
//! - [`ScoreCalculator`] turns metrics into a weighted score and recommendations
//! - [`HealthScanner`] orchestrates both and stores the last scan plus a metric snapshot

mod hooks;
mod metrics;
mod score;

pub use hooks::{HookSet, ScanHook};
pub use metrics::{ratio, MetricSet, MetricValue, MetricsCollector};
pub use score::{
    format_bytes, BreakdownEntry, Category, MetricStatus, Recommendation, RecommendationKind,
    ScoreCalculator, ScoreCard, ScoreColor, ScoreLabel,
};

use crate::config::{Config, OrderStorage};
use crate::db::{Database, MetricSnapshot, VariationGroup};
use crate::error::{HealthError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metrics appended to the snapshot series on every scan
pub const SNAPSHOT_METRICS: [&str; 7] = [
    "autoload_size",
    "transient_count",
    "expired_transients",
    "wc_sessions",
    "orphaned_postmeta",
    "total_revisions",
    "postmeta_rows",
];

/// Snapshot type recorded by [`HealthScanner::run_scan`]
pub const SNAPSHOT_TYPE_SCAN: &str = "scan";

/// Largest number of autoloaded options returned at once
pub const MAX_TOP_AUTOLOADED: usize = 50;

/// Full result of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub scanned_at: DateTime<Utc>,
    pub health_score: u32,
    pub score_label: ScoreLabel,
    pub score_color: ScoreColor,
    pub metrics: MetricSet,
    pub breakdown: BTreeMap<Category, BreakdownEntry>,
    pub recommendations: Vec<Recommendation>,
}

/// Autoloaded option formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoloadEntry {
    pub name: String,
    pub size: String,
    pub raw: i64,
}

/// A headline metric prepared for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayMetric {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// Runs scans against one store
pub struct HealthScanner<'a> {
    db: &'a Database,
    calculator: ScoreCalculator,
    order_storage: OrderStorage,
    hooks: HookSet,
}

impl<'a> HealthScanner<'a> {
    pub fn new(db: &'a Database, config: &Config) -> Self {
        Self {
            db,
            calculator: ScoreCalculator::from_config(&config.scoring),
            order_storage: config.store.order_storage,
            hooks: HookSet::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_calculator(mut self, calculator: ScoreCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn collector(&self) -> MetricsCollector<'a> {
        MetricsCollector::new(self.db, self.order_storage)
    }

    /// Collect, score, persist and return a fresh scan
    ///
    /// Any failure is returned as an error and leaves the previous scan
    /// record untouched.
    pub fn run_scan(&self) -> Result<ScanResult> {
        self.hooks.before_scan();

        let metrics = self.collector().collect_all()?;
        let metrics = self.hooks.filter_metrics(metrics);

        let card = self.calculator.calculate(&metrics);
        let recommendations = self
            .calculator
            .generate_recommendations(&metrics, &card.breakdown);
        let recommendations =
            self.hooks
                .filter_recommendations(recommendations, &metrics, &card.breakdown);

        let result = ScanResult {
            scanned_at: Utc::now(),
            health_score: card.score,
            score_label: card.label,
            score_color: card.color,
            metrics,
            breakdown: card.breakdown,
            recommendations,
        };

        let snapshot: Vec<(&str, i64)> = SNAPSHOT_METRICS
            .iter()
            .filter_map(|key| result.metrics.get(key).map(|v| (*key, v.as_i64())))
            .collect();
        self.db.record_scan(&result, &snapshot, SNAPSHOT_TYPE_SCAN)?;

        tracing::info!(
            "Health scan complete: score {} ({}), {} recommendation(s)",
            result.health_score,
            result.score_label,
            result.recommendations.len()
        );

        self.hooks.scan_complete(&result);
        Ok(result)
    }

    pub fn get_last_scan(&self) -> Result<Option<ScanResult>> {
        self.db.last_scan()
    }

    pub fn has_scan_data(&self) -> Result<bool> {
        Ok(self.get_last_scan()?.is_some())
    }

    pub fn clear_scan_data(&self) -> Result<bool> {
        self.db.clear_last_scan()
    }

    /// Human-readable age of the last scan, e.g. "5 mins"
    pub fn time_since_scan(&self) -> Result<Option<String>> {
        Ok(self
            .get_last_scan()?
            .map(|scan| human_time_diff(Utc::now() - scan.scanned_at)))
    }

    /// Largest autoloaded options; `limit` is clamped to 1..=50
    pub fn get_top_autoloaded(&self, limit: usize) -> Result<Vec<AutoloadEntry>> {
        let limit = limit.clamp(1, MAX_TOP_AUTOLOADED);
        let options = self.collector().top_autoloaded(limit)?;
        Ok(options
            .into_iter()
            .map(|option| AutoloadEntry {
                size: format_bytes(option.size),
                raw: option.size,
                name: option.name,
            })
            .collect())
    }

    pub fn get_high_variation(&self, threshold: usize, limit: usize) -> Result<Vec<VariationGroup>> {
        self.collector().high_variation_products(threshold, limit)
    }

    pub fn metric_history(&self, metric_key: &str, limit: usize) -> Result<Vec<MetricSnapshot>> {
        self.db.metric_history(metric_key, limit)
    }

    /// Delete snapshots older than `days` days
    pub fn prune_snapshots(&self, days: u32) -> Result<usize> {
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .ok_or_else(|| {
                HealthError::InvalidInput(format!("retention of {} days is out of range", days))
            })?;
        let pruned = self.db.prune_snapshots(cutoff)?;
        tracing::debug!("Pruned {} snapshot row(s) older than {} days", pruned, days);
        Ok(pruned)
    }
}

/// Headline metrics of a scan, formatted for display
pub fn display_metrics(scan: &ScanResult) -> Vec<DisplayMetric> {
    let m = &scan.metrics;
    vec![
        DisplayMetric {
            key: "autoload_size",
            label: "Autoload Size",
            value: format_bytes(m.autoload_size),
            sub: None,
        },
        DisplayMetric {
            key: "transients",
            label: "Transients",
            value: m.transient_count.to_string(),
            sub: Some(format!("{} expired", m.expired_transients)),
        },
        DisplayMetric {
            key: "sessions",
            label: "Sessions",
            value: m.wc_sessions.to_string(),
            sub: Some(format!("{} expired", m.expired_wc_sessions)),
        },
        DisplayMetric {
            key: "orphaned_meta",
            label: "Orphaned Meta",
            value: m.orphaned_postmeta.to_string(),
            sub: None,
        },
        DisplayMetric {
            key: "revisions",
            label: "Revisions",
            value: m.total_revisions.to_string(),
            sub: None,
        },
        DisplayMetric {
            key: "products",
            label: "Products",
            value: m.total_products.to_string(),
            sub: Some(format!("{} variations", m.total_variations)),
        },
        DisplayMetric {
            key: "orders",
            label: "Orders",
            value: m.total_orders.to_string(),
            sub: None,
        },
        DisplayMetric {
            key: "postmeta_rows",
            label: "Postmeta Rows",
            value: m.postmeta_rows.to_string(),
            sub: None,
        },
    ]
}

/// Coarse elapsed-time string in the largest fitting unit
pub fn human_time_diff(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);

    let (amount, unit) = if secs < 60 {
        (secs.max(1), "sec")
    } else if secs < 3600 {
        (secs / 60, "min")
    } else if secs < 86_400 {
        (secs / 3600, "hour")
    } else if secs < 7 * 86_400 {
        (secs / 86_400, "day")
    } else if secs < 30 * 86_400 {
        (secs / (7 * 86_400), "week")
    } else if secs < 365 * 86_400 {
        (secs / (30 * 86_400), "month")
    } else {
        (secs / (365 * 86_400), "year")
    };

    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}
