//! Configuration management

use crate::error::{HealthError, Result};
use crate::scanner::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted revisions `keep`
pub const MAX_REVISIONS_KEEP: i64 = 50;

/// Largest accepted cleanup batch size
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Score weights and thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Cleanup behaviour
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Store layout
    #[serde(default)]
    pub store: StoreConfig,
}

/// Weights and thresholds used by the score calculator
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: Weights,

    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Relative weight of each scoring category
///
/// Weights need not sum to 1; the final score is normalised by their sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Weights {
    pub autoload: f64,
    pub orphaned_meta: f64,
    pub expired_transients: f64,
    pub sessions: f64,
    pub meta_per_product: f64,
    pub revisions: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            autoload: 0.25,
            orphaned_meta: 0.20,
            expired_transients: 0.15,
            sessions: 0.15,
            meta_per_product: 0.15,
            revisions: 0.10,
        }
    }
}

impl Weights {
    /// Weight of one category
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Autoload => self.autoload,
            Category::OrphanedMeta => self.orphaned_meta,
            Category::ExpiredTransients => self.expired_transients,
            Category::Sessions => self.sessions,
            Category::MetaPerProduct => self.meta_per_product,
            Category::Revisions => self.revisions,
        }
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Step thresholds for one category
///
/// A value at or below `excellent` scores 100, at or below `good` scores 70,
/// at or below `fair` (when set) scores 50, anything larger scores 30.
/// Values above `severe` (when set) make the recommendation critical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Threshold {
    pub excellent: f64,
    pub good: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severe: Option<f64>,
}

impl Threshold {
    pub const fn new(excellent: f64, good: f64) -> Self {
        Self {
            excellent,
            good,
            fair: None,
            severe: None,
        }
    }

    pub const fn with_fair(mut self, fair: f64) -> Self {
        self.fair = Some(fair);
        self
    }

    pub const fn with_severe(mut self, severe: f64) -> Self {
        self.severe = Some(severe);
        self
    }
}

/// Thresholds for every scoring category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Autoloaded bytes
    pub autoload: Threshold,
    /// Orphaned share of all metadata rows (0.0-1.0); `severe` applies to the raw count
    pub orphaned_meta: Threshold,
    pub expired_transients: Threshold,
    pub sessions: Threshold,
    pub meta_per_product: Threshold,
    /// Average revisions per post
    pub revisions: Threshold,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            autoload: Threshold::new(500_000.0, 1_000_000.0)
                .with_fair(2_000_000.0)
                .with_severe(1_000_000.0),
            orphaned_meta: Threshold::new(0.01, 0.05).with_severe(1000.0),
            expired_transients: Threshold::new(50.0, 200.0),
            sessions: Threshold::new(100.0, 500.0),
            meta_per_product: Threshold::new(50.0, 100.0),
            revisions: Threshold::new(5.0, 20.0),
        }
    }
}

impl Thresholds {
    /// Thresholds of one category
    pub fn get(&self, category: Category) -> &Threshold {
        match category {
            Category::Autoload => &self.autoload,
            Category::OrphanedMeta => &self.orphaned_meta,
            Category::ExpiredTransients => &self.expired_transients,
            Category::Sessions => &self.sessions,
            Category::MetaPerProduct => &self.meta_per_product,
            Category::Revisions => &self.revisions,
        }
    }
}

/// Cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanupConfig {
    /// Newest revisions retained per record; negative removes every revision
    #[serde(default = "default_revisions_keep")]
    pub revisions_keep: i64,

    /// Rows deleted per batch by the batched cleaners
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            revisions_keep: default_revisions_keep(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_revisions_keep() -> i64 {
    std::env::var("STOREHEALTH_REVISIONS_KEEP")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5)
}

fn default_batch_size() -> usize {
    500
}

/// Where orders are stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStorage {
    /// Orders are records in the posts table
    #[default]
    Posts,
    /// Orders live in the dedicated high-performance order table
    Hpos,
}

/// Store layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub order_storage: OrderStorage,
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a path, falling back to defaults when it does not exist
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save config to a path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject values the scanner and cleaners cannot work with
    pub fn validate(&self) -> Result<()> {
        let weights = &self.scoring.weights;
        for category in Category::ALL {
            let weight = weights.get(category);
            if !weight.is_finite() || weight < 0.0 {
                return Err(HealthError::Config(format!(
                    "weight for {} must be a non-negative number, got {}",
                    category, weight
                )));
            }

            let threshold = self.scoring.thresholds.get(category);
            if !threshold.excellent.is_finite() || !threshold.good.is_finite() {
                return Err(HealthError::Config(format!(
                    "thresholds for {} must be finite",
                    category
                )));
            }
            if threshold.excellent > threshold.good {
                return Err(HealthError::Config(format!(
                    "excellent threshold for {} exceeds its good threshold",
                    category
                )));
            }
            if let Some(fair) = threshold.fair {
                if !fair.is_finite() || fair < threshold.good {
                    return Err(HealthError::Config(format!(
                        "fair threshold for {} must be at least its good threshold",
                        category
                    )));
                }
            }
        }

        if weights.total() <= 0.0 {
            return Err(HealthError::Config(
                "at least one scoring weight must be positive".to_string(),
            ));
        }

        if self.cleanup.revisions_keep > MAX_REVISIONS_KEEP {
            return Err(HealthError::Config(format!(
                "revisions_keep must be at most {}, got {}",
                MAX_REVISIONS_KEEP, self.cleanup.revisions_keep
            )));
        }

        if self.cleanup.batch_size == 0 || self.cleanup.batch_size > MAX_BATCH_SIZE {
            return Err(HealthError::Config(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.cleanup.batch_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_weights() {
        let weights = Weights::default();
        assert_eq!(weights.get(Category::Autoload), 0.25);
        assert_eq!(weights.get(Category::Revisions), 0.10);
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
scoring:
  weights:
    autoload: 0.5
cleanup:
  revisions_keep: 3
store:
  order_storage: hpos
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.scoring.weights.autoload, 0.5);
        assert_eq!(config.scoring.weights.orphaned_meta, 0.20);
        assert_eq!(config.scoring.thresholds, Thresholds::default());
        assert_eq!(config.cleanup.revisions_keep, 3);
        assert_eq!(config.cleanup.batch_size, 500);
        assert_eq!(config.store.order_storage, OrderStorage::Hpos);
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = Config::default();
        config.scoring.weights.sessions = -0.1;
        assert!(matches!(config.validate(), Err(HealthError::Config(_))));
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let mut config = Config::default();
        config.scoring.weights = Weights {
            autoload: 0.0,
            orphaned_meta: 0.0,
            expired_transients: 0.0,
            sessions: 0.0,
            meta_per_product: 0.0,
            revisions: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.scoring.thresholds.sessions = Threshold::new(500.0, 100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_cleanup() {
        let mut config = Config::default();
        config.cleanup.revisions_keep = 51;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cleanup.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cleanup.revisions_keep = -1;
        config.validate().unwrap();
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("config.yml");

        let mut config = Config::default();
        config.cleanup.revisions_keep = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let loaded = Config::load_from(temp.path().join("nope.yml")).unwrap();
        assert_eq!(loaded.cleanup.batch_size, 500);
    }
}
