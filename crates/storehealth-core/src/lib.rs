//! Storehealth Core Library
//!
//! Store database health diagnostics.
//!
//! # Features
//! - Read-only bloat metrics (autoload size, orphaned metadata, transients, sessions, revisions)
//! - Weighted 0-100 health score with per-category breakdown and recommendations
//! - Preview/execute cleanup operations behind a pluggable registry
//! - Scan persistence with a metric snapshot history

pub mod cleanup;
pub mod config;
pub mod db;
pub mod error;
pub mod scanner;
pub mod service;

pub use cleanup::{
    CleanupErrorKind, CleanupManager, CleanupOperation, CleanupTypeInfo, ExecuteResponse,
    PreviewResponse, RevisionRetention,
};
pub use config::{CleanupConfig, Config, OrderStorage, ScoringConfig, Threshold, Thresholds, Weights};
pub use db::{AutoloadedOption, Database, MetricSnapshot, NewPost, VariationGroup};
pub use error::{Error, HealthError, Result};
pub use scanner::{
    format_bytes, AutoloadEntry, BreakdownEntry, Category, HealthScanner, HookSet, MetricSet,
    MetricValue, MetricsCollector, Recommendation, RecommendationKind, ScanHook, ScanResult,
    ScoreCalculator, ScoreColor, ScoreLabel,
};
pub use service::StoreHealth;

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "storehealth";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "storehealth";
