//! Cleanup operations
//!
//! Each bloat category is a [`CleanupOperation`] with a side-effect free
//! `preview` and an `execute` that leaves nothing for the next preview to
//! find. [`CleanupManager`] is the registry callers dispatch through:
//! - transients: expired transient pairs
//! - sessions: expired customer sessions
//! - orphaned_meta: metadata rows whose record is gone
//! - revisions: revisions beyond the retention limit
//! - trash: trashed records and everything they own

mod orphaned_meta;
mod revisions;
mod sessions;
mod transients;
mod trash;

pub use orphaned_meta::OrphanedMetaCleaner;
pub use revisions::{RevisionCleaner, RevisionRetention};
pub use sessions::SessionCleaner;
pub use transients::TransientCleaner;
pub use trash::TrashCleaner;

use crate::config::CleanupConfig;
use crate::db::Database;
use crate::error::Result;
use crate::scanner::HookSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One cleanable bloat category
pub trait CleanupOperation: Send + Sync {
    /// Registry key (e.g. "transients")
    fn cleanup_type(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Count what `execute` would remove, without changing anything
    fn preview(&self, db: &Database) -> Result<usize>;

    /// Remove eligible items, returning how many were deleted
    fn execute(&self, db: &Database) -> Result<usize>;
}

/// Why a cleanup request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupErrorKind {
    InvalidCategory,
    OperationFailed,
}

/// Envelope returned by [`CleanupManager::preview`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub cleanup_type: String,
    pub count: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CleanupErrorKind>,
}

/// Envelope returned by [`CleanupManager::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub cleanup_type: String,
    pub before: usize,
    pub deleted: usize,
    pub after: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CleanupErrorKind>,
}

/// Registered cleanup type as shown to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupTypeInfo {
    #[serde(rename = "type")]
    pub cleanup_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const INVALID_TYPE_MESSAGE: &str = "Invalid cleanup type.";

fn items(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", count)
    }
}

/// Registry and dispatcher for cleanup operations
pub struct CleanupManager {
    operations: BTreeMap<String, Arc<dyn CleanupOperation>>,
    hooks: HookSet,
}

impl CleanupManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            operations: BTreeMap::new(),
            hooks: HookSet::new(),
        }
    }

    /// Create a manager with the five built-in operations
    pub fn with_defaults(config: &CleanupConfig) -> Self {
        let mut manager = Self::new();
        manager.register(Arc::new(TransientCleaner::new()));
        manager.register(Arc::new(SessionCleaner::new()));
        manager.register(Arc::new(OrphanedMetaCleaner::new(config.batch_size)));
        manager.register(Arc::new(RevisionCleaner::new(
            RevisionRetention::from(config.revisions_keep),
            config.batch_size,
        )));
        manager.register(Arc::new(TrashCleaner::new()));
        manager
    }

    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.set_hooks(hooks);
        self
    }

    /// Replace the hooks notified after each execute
    pub fn set_hooks(&mut self, hooks: HookSet) {
        self.hooks = hooks;
    }

    /// Register an operation, replacing any with the same type
    pub fn register(&mut self, operation: Arc<dyn CleanupOperation>) {
        self.operations
            .insert(operation.cleanup_type().to_string(), operation);
    }

    pub fn get(&self, cleanup_type: &str) -> Option<Arc<dyn CleanupOperation>> {
        self.operations.get(cleanup_type).cloned()
    }

    pub fn has_type(&self, cleanup_type: &str) -> bool {
        self.operations.contains_key(cleanup_type)
    }

    pub fn available_types(&self) -> Vec<CleanupTypeInfo> {
        self.operations
            .values()
            .map(|op| CleanupTypeInfo {
                cleanup_type: op.cleanup_type(),
                name: op.name(),
                description: op.description(),
            })
            .collect()
    }

    pub fn preview(&self, db: &Database, cleanup_type: &str) -> PreviewResponse {
        let failure = |message: String, kind| PreviewResponse {
            success: false,
            cleanup_type: cleanup_type.to_string(),
            count: 0,
            message,
            error: Some(kind),
        };

        let Some(operation) = self.get(cleanup_type) else {
            return failure(
                INVALID_TYPE_MESSAGE.to_string(),
                CleanupErrorKind::InvalidCategory,
            );
        };

        match operation.preview(db) {
            Ok(count) => PreviewResponse {
                success: true,
                cleanup_type: cleanup_type.to_string(),
                count,
                message: format!("{} found", items(count)),
                error: None,
            },
            Err(e) => failure(e.to_string(), CleanupErrorKind::OperationFailed),
        }
    }

    pub fn execute(&self, db: &Database, cleanup_type: &str) -> ExecuteResponse {
        let failure = |message: String, kind| ExecuteResponse {
            success: false,
            cleanup_type: cleanup_type.to_string(),
            before: 0,
            deleted: 0,
            after: 0,
            message,
            error: Some(kind),
        };

        let Some(operation) = self.get(cleanup_type) else {
            return failure(
                INVALID_TYPE_MESSAGE.to_string(),
                CleanupErrorKind::InvalidCategory,
            );
        };

        let run = || -> Result<(usize, usize, usize)> {
            let before = operation.preview(db)?;
            let deleted = operation.execute(db)?;
            let after = operation.preview(db)?;
            Ok((before, deleted, after))
        };

        match run() {
            Ok((before, deleted, after)) => {
                tracing::info!(
                    "Cleanup {} removed {} (before {}, after {})",
                    cleanup_type,
                    deleted,
                    before,
                    after
                );
                self.hooks.cleanup_complete(cleanup_type, deleted);
                ExecuteResponse {
                    success: true,
                    cleanup_type: cleanup_type.to_string(),
                    before,
                    deleted,
                    after,
                    message: format!("{} cleaned", items(deleted)),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Cleanup {} failed: {}", cleanup_type, e);
                failure(e.to_string(), CleanupErrorKind::OperationFailed)
            }
        }
    }

    /// Preview count of every registered type; failures count as 0
    pub fn get_all_counts(&self, db: &Database) -> BTreeMap<String, usize> {
        self.operations
            .iter()
            .map(|(cleanup_type, operation)| {
                let count = operation.preview(db).unwrap_or_else(|e| {
                    tracing::warn!("Could not count {}: {}", cleanup_type, e);
                    0
                });
                (cleanup_type.clone(), count)
            })
            .collect()
    }
}

impl Default for CleanupManager {
    fn default() -> Self {
        Self::with_defaults(&CleanupConfig::default())
    }
}
