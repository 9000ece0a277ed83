//! Read-only metric collection

use crate::config::OrderStorage;
use crate::db::{AutoloadedOption, Database, VariationGroup, POST_TYPE_REVISION, POST_TYPE_VARIATION};
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single metric value: a count/byte size or a ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Int(v) => *v as f64,
            MetricValue::Float(v) => *v,
        }
    }

    /// Integer form, truncating ratios
    pub fn as_i64(&self) -> i64 {
        match self {
            MetricValue::Int(v) => *v,
            MetricValue::Float(v) => *v as i64,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{:.2}", v),
        }
    }
}

/// Every metric produced by one scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub autoload_size: i64,
    pub autoload_count: i64,
    pub total_options: i64,
    pub transient_count: i64,
    pub expired_transients: i64,
    pub total_posts: i64,
    pub total_revisions: i64,
    pub trashed_posts: i64,
    pub postmeta_rows: i64,
    pub orphaned_postmeta: i64,
    pub total_products: i64,
    pub total_variations: i64,
    pub total_orders: i64,
    pub wc_sessions: i64,
    pub expired_wc_sessions: i64,
    pub meta_per_product: f64,
    pub revisions_per_post: f64,
}

impl MetricSet {
    /// Metric names in collection order
    pub const NAMES: [&'static str; 17] = [
        "autoload_size",
        "autoload_count",
        "total_options",
        "transient_count",
        "expired_transients",
        "total_posts",
        "total_revisions",
        "trashed_posts",
        "postmeta_rows",
        "orphaned_postmeta",
        "total_products",
        "total_variations",
        "total_orders",
        "wc_sessions",
        "expired_wc_sessions",
        "meta_per_product",
        "revisions_per_post",
    ];

    /// Look a metric up by name
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        use MetricValue::{Float, Int};
        let value = match name {
            "autoload_size" => Int(self.autoload_size),
            "autoload_count" => Int(self.autoload_count),
            "total_options" => Int(self.total_options),
            "transient_count" => Int(self.transient_count),
            "expired_transients" => Int(self.expired_transients),
            "total_posts" => Int(self.total_posts),
            "total_revisions" => Int(self.total_revisions),
            "trashed_posts" => Int(self.trashed_posts),
            "postmeta_rows" => Int(self.postmeta_rows),
            "orphaned_postmeta" => Int(self.orphaned_postmeta),
            "total_products" => Int(self.total_products),
            "total_variations" => Int(self.total_variations),
            "total_orders" => Int(self.total_orders),
            "wc_sessions" => Int(self.wc_sessions),
            "expired_wc_sessions" => Int(self.expired_wc_sessions),
            "meta_per_product" => Float(self.meta_per_product),
            "revisions_per_post" => Float(self.revisions_per_post),
            _ => return None,
        };
        Some(value)
    }

    /// All metrics as (name, value) pairs in collection order
    pub fn entries(&self) -> Vec<(&'static str, MetricValue)> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
            .collect()
    }
}

/// `numerator / denominator` rounded to 2 decimals, 0.0 for an empty denominator
pub fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() / 100.0
}

/// Aggregates bloat indicators from the store
pub struct MetricsCollector<'a> {
    db: &'a Database,
    order_storage: OrderStorage,
    now: i64,
}

impl<'a> MetricsCollector<'a> {
    pub fn new(db: &'a Database, order_storage: OrderStorage) -> Self {
        Self {
            db,
            order_storage,
            now: Utc::now().timestamp(),
        }
    }

    /// Evaluate expiries against a fixed Unix timestamp
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    /// Run every getter once
    pub fn collect_all(&self) -> Result<MetricSet> {
        Ok(MetricSet {
            autoload_size: self.autoload_size()?,
            autoload_count: self.autoload_count()?,
            total_options: self.total_options()?,
            transient_count: self.transient_count()?,
            expired_transients: self.expired_transients()?,
            total_posts: self.total_posts()?,
            total_revisions: self.total_revisions()?,
            trashed_posts: self.trashed_posts()?,
            postmeta_rows: self.postmeta_rows()?,
            orphaned_postmeta: self.orphaned_postmeta()?,
            total_products: self.total_products()?,
            total_variations: self.total_variations()?,
            total_orders: self.total_orders()?,
            wc_sessions: self.wc_sessions()?,
            expired_wc_sessions: self.expired_wc_sessions()?,
            meta_per_product: self.meta_per_product()?,
            revisions_per_post: self.revisions_per_post()?,
        })
    }

    pub fn autoload_size(&self) -> Result<i64> {
        self.db.autoload_size()
    }

    pub fn autoload_count(&self) -> Result<i64> {
        self.db.autoload_count()
    }

    pub fn total_options(&self) -> Result<i64> {
        self.db.option_count()
    }

    pub fn transient_count(&self) -> Result<i64> {
        self.db.transient_count()
    }

    pub fn expired_transients(&self) -> Result<i64> {
        self.db.expired_transient_count(self.now)
    }

    pub fn total_posts(&self) -> Result<i64> {
        self.db.content_post_count()
    }

    pub fn total_revisions(&self) -> Result<i64> {
        self.db.post_type_count(POST_TYPE_REVISION)
    }

    pub fn trashed_posts(&self) -> Result<i64> {
        self.db.trashed_post_count()
    }

    pub fn postmeta_rows(&self) -> Result<i64> {
        self.db.postmeta_count()
    }

    pub fn orphaned_postmeta(&self) -> Result<i64> {
        self.db.orphaned_postmeta_count()
    }

    pub fn total_products(&self) -> Result<i64> {
        self.db.product_count()
    }

    pub fn total_variations(&self) -> Result<i64> {
        self.db.post_type_count(POST_TYPE_VARIATION)
    }

    pub fn total_orders(&self) -> Result<i64> {
        self.db.order_count(self.order_storage)
    }

    pub fn wc_sessions(&self) -> Result<i64> {
        self.db.session_count()
    }

    pub fn expired_wc_sessions(&self) -> Result<i64> {
        self.db.expired_session_count(self.now)
    }

    /// Average metadata rows per product
    pub fn meta_per_product(&self) -> Result<f64> {
        let products = self.total_products()?;
        if products == 0 {
            return Ok(0.0);
        }
        Ok(ratio(self.db.product_meta_count()?, products))
    }

    /// Average revisions per content record
    pub fn revisions_per_post(&self) -> Result<f64> {
        let posts = self.total_posts()?;
        if posts == 0 {
            return Ok(0.0);
        }
        Ok(ratio(self.total_revisions()?, posts))
    }

    /// Largest autoloaded options
    pub fn top_autoloaded(&self, limit: usize) -> Result<Vec<AutoloadedOption>> {
        self.db.top_autoloaded_options(limit)
    }

    /// Products with at least `threshold` variations
    pub fn high_variation_products(
        &self,
        threshold: usize,
        limit: usize,
    ) -> Result<Vec<VariationGroup>> {
        self.db.high_variation_products(threshold, limit)
    }
}
