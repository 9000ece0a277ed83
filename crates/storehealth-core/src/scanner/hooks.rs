//! Scan and cleanup extension points

use super::metrics::MetricSet;
use super::score::{BreakdownEntry, Category, Recommendation};
use super::ScanResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Subscriber notified during scans and cleanups
///
/// Every method has a no-op default, so implementors override only what they need.
pub trait ScanHook: Send + Sync {
    /// Called before any metric is collected
    fn before_scan(&self) {}

    /// Adjust metrics before they are scored
    fn filter_metrics(&self, metrics: MetricSet) -> MetricSet {
        metrics
    }

    /// Adjust the generated recommendations
    fn filter_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
        _metrics: &MetricSet,
        _breakdown: &BTreeMap<Category, BreakdownEntry>,
    ) -> Vec<Recommendation> {
        recommendations
    }

    /// Called after the scan result has been stored
    fn scan_complete(&self, _result: &ScanResult) {}

    /// Called after a cleanup operation executes
    fn cleanup_complete(&self, _cleanup_type: &str, _deleted: usize) {}
}

/// Ordered list of hooks; filters are chained in registration order
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: Vec<Arc<dyn ScanHook>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Arc<dyn ScanHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn before_scan(&self) {
        for hook in &self.hooks {
            hook.before_scan();
        }
    }

    pub fn filter_metrics(&self, metrics: MetricSet) -> MetricSet {
        self.hooks
            .iter()
            .fold(metrics, |metrics, hook| hook.filter_metrics(metrics))
    }

    pub fn filter_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
        metrics: &MetricSet,
        breakdown: &BTreeMap<Category, BreakdownEntry>,
    ) -> Vec<Recommendation> {
        self.hooks.iter().fold(recommendations, |recs, hook| {
            hook.filter_recommendations(recs, metrics, breakdown)
        })
    }

    pub fn scan_complete(&self, result: &ScanResult) {
        for hook in &self.hooks {
            hook.scan_complete(result);
        }
    }

    pub fn cleanup_complete(&self, cleanup_type: &str, deleted: usize) {
        for hook in &self.hooks {
            hook.cleanup_complete(cleanup_type, deleted);
        }
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
