//! Application context tying storage, configuration, hooks and cleanup together

use crate::cleanup::{
    CleanupManager, CleanupOperation, CleanupTypeInfo, ExecuteResponse, PreviewResponse,
};
use crate::config::Config;
use crate::db::{Database, MetricSnapshot, VariationGroup};
use crate::error::{HealthError, Result};
use crate::scanner::{AutoloadEntry, HealthScanner, HookSet, ScanHook, ScanResult};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// One store under diagnosis
pub struct StoreHealth {
    db: Database,
    config: Config,
    hooks: HookSet,
    cleanup: CleanupManager,
}

impl StoreHealth {
    /// Open (and initialize) the database at `path`
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let db = Database::open(path)?;
        db.initialize()?;
        Self::new(db, config)
    }

    /// Wrap an already initialized database
    pub fn new(db: Database, config: Config) -> Result<Self> {
        config.validate()?;
        let cleanup = CleanupManager::with_defaults(&config.cleanup);
        Ok(Self {
            db,
            config,
            hooks: HookSet::new(),
            cleanup,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cleanup(&self) -> &CleanupManager {
        &self.cleanup
    }

    /// Subscribe a hook to scans and cleanups
    pub fn register_hook(&mut self, hook: Arc<dyn ScanHook>) {
        self.hooks.register(hook);
        self.cleanup.set_hooks(self.hooks.clone());
    }

    /// Add or replace a cleanup operation
    pub fn register_cleanup(&mut self, operation: Arc<dyn CleanupOperation>) {
        self.cleanup.register(operation);
    }

    pub fn scanner(&self) -> HealthScanner<'_> {
        HealthScanner::new(&self.db, &self.config).with_hooks(self.hooks.clone())
    }

    pub fn run_scan(&self) -> Result<ScanResult> {
        self.scanner().run_scan()
    }

    pub fn get_last_scan(&self) -> Result<Option<ScanResult>> {
        self.scanner().get_last_scan()
    }

    /// Last scan, or [`HealthError::ScanNotFound`] if none has run
    pub fn require_last_scan(&self) -> Result<ScanResult> {
        self.get_last_scan()?.ok_or(HealthError::ScanNotFound)
    }

    pub fn get_top_autoloaded(&self, limit: usize) -> Result<Vec<AutoloadEntry>> {
        self.scanner().get_top_autoloaded(limit)
    }

    pub fn get_high_variation(&self, threshold: usize, limit: usize) -> Result<Vec<VariationGroup>> {
        self.scanner().get_high_variation(threshold, limit)
    }

    pub fn metric_history(&self, metric_key: &str, limit: usize) -> Result<Vec<MetricSnapshot>> {
        self.scanner().metric_history(metric_key, limit)
    }

    pub fn preview_cleanup(&self, cleanup_type: &str) -> PreviewResponse {
        self.cleanup.preview(&self.db, cleanup_type)
    }

    pub fn execute_cleanup(&self, cleanup_type: &str) -> ExecuteResponse {
        self.cleanup.execute(&self.db, cleanup_type)
    }

    pub fn cleanup_counts(&self) -> BTreeMap<String, usize> {
        self.cleanup.get_all_counts(&self.db)
    }

    pub fn cleanup_types(&self) -> Vec<CleanupTypeInfo> {
        self.cleanup.available_types()
    }
}
