//! Weighted health scoring and recommendations

use super::metrics::{ratio, MetricSet, MetricValue};
use crate::config::{ScoringConfig, Threshold, Thresholds, Weights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scored aspect of store health
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Autoload,
    OrphanedMeta,
    ExpiredTransients,
    #[serde(rename = "wc_sessions")]
    Sessions,
    MetaPerProduct,
    Revisions,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Autoload,
        Category::OrphanedMeta,
        Category::ExpiredTransients,
        Category::Sessions,
        Category::MetaPerProduct,
        Category::Revisions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Autoload => "autoload",
            Category::OrphanedMeta => "orphaned_meta",
            Category::ExpiredTransients => "expired_transients",
            Category::Sessions => "wc_sessions",
            Category::MetaPerProduct => "meta_per_product",
            Category::Revisions => "revisions",
        }
    }

    /// Value compared against the category's thresholds
    pub fn input(&self, metrics: &MetricSet) -> f64 {
        match self {
            Category::Autoload => metrics.autoload_size as f64,
            Category::OrphanedMeta => orphaned_ratio(metrics),
            Category::ExpiredTransients => metrics.expired_transients as f64,
            Category::Sessions => metrics.wc_sessions as f64,
            Category::MetaPerProduct => metrics.meta_per_product,
            Category::Revisions => metrics.revisions_per_post,
        }
    }

    /// Raw value reported in the breakdown and compared against `severe`
    pub fn raw_value(&self, metrics: &MetricSet) -> MetricValue {
        match self {
            Category::Autoload => MetricValue::Int(metrics.autoload_size),
            Category::OrphanedMeta => MetricValue::Int(metrics.orphaned_postmeta),
            Category::ExpiredTransients => MetricValue::Int(metrics.expired_transients),
            Category::Sessions => MetricValue::Int(metrics.wc_sessions),
            Category::MetaPerProduct => MetricValue::Float(metrics.meta_per_product),
            Category::Revisions => MetricValue::Int(metrics.total_revisions),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn orphaned_ratio(metrics: &MetricSet) -> f64 {
    if metrics.postmeta_rows == 0 {
        return 0.0;
    }
    metrics.orphaned_postmeta as f64 / metrics.postmeta_rows as f64
}

/// Status of a single category score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl MetricStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => MetricStatus::Excellent,
            70..=89 => MetricStatus::Good,
            40..=69 => MetricStatus::Warning,
            _ => MetricStatus::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricStatus::Excellent => "excellent",
            MetricStatus::Good => "good",
            MetricStatus::Warning => "warning",
            MetricStatus::Critical => "critical",
        }
    }
}

/// Overall label for a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Critical,
}

impl ScoreLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => ScoreLabel::Excellent,
            60..=79 => ScoreLabel::Good,
            40..=59 => ScoreLabel::NeedsAttention,
            _ => ScoreLabel::Critical,
        }
    }

    pub fn color(&self) -> ScoreColor {
        match self {
            ScoreLabel::Excellent => ScoreColor::Green,
            ScoreLabel::Good => ScoreColor::Yellow,
            ScoreLabel::NeedsAttention => ScoreColor::Orange,
            ScoreLabel::Critical => ScoreColor::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::NeedsAttention => "Needs Attention",
            ScoreLabel::Critical => "Critical",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ScoreColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreColor::Green => "green",
            ScoreColor::Yellow => "yellow",
            ScoreColor::Orange => "orange",
            ScoreColor::Red => "red",
        }
    }
}

/// Score details for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub score: u32,
    pub weight: f64,
    pub value: MetricValue,
    pub status: MetricStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<i64>,
}

/// Output of [`ScoreCalculator::calculate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: u32,
    pub label: ScoreLabel,
    pub color: ScoreColor,
    pub breakdown: BTreeMap<Category, BreakdownEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Info,
    Warning,
    Critical,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Info => "info",
            RecommendationKind::Warning => "warning",
            RecommendationKind::Critical => "critical",
        }
    }
}

/// Suggested remedy for a poorly scoring category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub area: String,
    pub message: String,
    pub action: String,
}

/// Category scores below this produce a recommendation
const RECOMMENDATION_CUTOFF: u32 = 70;

/// Turns a metric set into a weighted 0-100 score
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: Weights,
    thresholds: Thresholds,
}

impl ScoreCalculator {
    pub fn new(weights: Weights, thresholds: Thresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.weights, config.thresholds)
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Score one category value against its thresholds
    pub fn score_value(threshold: &Threshold, value: f64) -> u32 {
        if value <= threshold.excellent {
            100
        } else if value <= threshold.good {
            70
        } else if threshold.fair.is_some_and(|fair| value <= fair) {
            50
        } else {
            30
        }
    }

    pub fn score_category(&self, category: Category, metrics: &MetricSet) -> u32 {
        Self::score_value(self.thresholds.get(category), category.input(metrics))
    }

    pub fn calculate(&self, metrics: &MetricSet) -> ScoreCard {
        let mut breakdown = BTreeMap::new();
        let mut total_score = 0.0;
        let mut total_weight = 0.0;

        for category in Category::ALL {
            let score = self.score_category(category, metrics);
            let weight = self.weights.get(category);
            total_score += score as f64 * weight;
            total_weight += weight;

            let mut entry = BreakdownEntry {
                score,
                weight,
                value: category.raw_value(metrics),
                status: MetricStatus::from_score(score),
                display: None,
                ratio: None,
                expired: None,
            };

            match category {
                Category::Autoload => {
                    entry.display = Some(format_bytes(metrics.autoload_size));
                }
                Category::OrphanedMeta => {
                    let percent = ratio(metrics.orphaned_postmeta * 100, metrics.postmeta_rows);
                    entry.ratio = Some(percent);
                    entry.display = Some(format!("{}%", percent));
                }
                Category::Sessions => {
                    entry.expired = Some(metrics.expired_wc_sessions);
                }
                Category::Revisions => {
                    entry.ratio = Some(metrics.revisions_per_post);
                }
                Category::ExpiredTransients | Category::MetaPerProduct => {}
            }

            breakdown.insert(category, entry);
        }

        let score = if total_weight > 0.0 {
            // Snap float noise before rounding half away from zero
            let average = (total_score / total_weight * 1e6).round() / 1e6;
            average.round() as u32
        } else {
            0
        };
        let label = ScoreLabel::from_score(score);

        ScoreCard {
            score,
            label,
            color: label.color(),
            breakdown,
        }
    }

    /// One recommendation per category scoring below 70, in category order
    pub fn generate_recommendations(
        &self,
        metrics: &MetricSet,
        breakdown: &BTreeMap<Category, BreakdownEntry>,
    ) -> Vec<Recommendation> {
        breakdown
            .iter()
            .filter(|(_, entry)| entry.score < RECOMMENDATION_CUTOFF)
            .map(|(category, entry)| self.recommend(*category, metrics, entry))
            .collect()
    }

    fn recommend(
        &self,
        category: Category,
        metrics: &MetricSet,
        entry: &BreakdownEntry,
    ) -> Recommendation {
        let severe = self
            .thresholds
            .get(category)
            .severe
            .is_some_and(|cutover| entry.value.as_f64() > cutover);
        let kind = match (category, severe) {
            (Category::MetaPerProduct, _) => RecommendationKind::Info,
            (_, true) => RecommendationKind::Critical,
            (_, false) => RecommendationKind::Warning,
        };

        let (area, message, action) = match category {
            Category::Autoload => (
                "autoload",
                format!(
                    "Autoload data size is {}. Consider reviewing large autoloaded options.",
                    format_bytes(metrics.autoload_size)
                ),
                "Review the largest autoloaded options.",
            ),
            Category::OrphanedMeta => (
                "orphaned_meta",
                format!(
                    "Found {} orphaned postmeta entries.",
                    metrics.orphaned_postmeta
                ),
                "Run the orphaned postmeta cleanup.",
            ),
            Category::ExpiredTransients => (
                "transients",
                format!("Found {} expired transients.", metrics.expired_transients),
                "Run the expired transients cleanup.",
            ),
            Category::Sessions => (
                "sessions",
                format!(
                    "Found {} customer sessions ({} expired).",
                    metrics.wc_sessions, metrics.expired_wc_sessions
                ),
                "Run the sessions cleanup.",
            ),
            Category::MetaPerProduct => (
                "product_meta",
                format!(
                    "Average of {:.1} meta entries per product. This may indicate plugin bloat.",
                    metrics.meta_per_product
                ),
                "Review installed plugins for excessive meta storage.",
            ),
            Category::Revisions => (
                "revisions",
                format!("Found {} post revisions.", metrics.total_revisions),
                "Run the revisions cleanup or lower the revision limit.",
            ),
        };

        Recommendation {
            kind,
            area: area.to_string(),
            message,
            action: action.to_string(),
        }
    }
}

/// Human-readable byte size (bytes, KB, MB)
pub fn format_bytes(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{} MB", round2(value / MB))
    } else if value >= KB {
        format!("{} KB", round2(value / KB))
    } else {
        format!("{} bytes", bytes)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn worked_example() -> MetricSet {
        MetricSet {
            autoload_size: 2_500_000,
            orphaned_postmeta: 50,
            postmeta_rows: 10_000,
            expired_transients: 10,
            wc_sessions: 50,
            meta_per_product: 30.0,
            revisions_per_post: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_worked_example() {
        let calc = ScoreCalculator::default();
        let card = calc.calculate(&worked_example());

        assert_eq!(card.breakdown[&Category::Autoload].score, 30);
        assert_eq!(card.breakdown[&Category::OrphanedMeta].score, 100);
        assert_eq!(card.score, 83);
        assert_eq!(card.label, ScoreLabel::Excellent);
        assert_eq!(card.color, ScoreColor::Green);
    }

    #[test]
    fn test_worked_example_recommendations() {
        let calc = ScoreCalculator::default();
        let metrics = worked_example();
        let card = calc.calculate(&metrics);
        let recs = calc.generate_recommendations(&metrics, &card.breakdown);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].area, "autoload");
        assert_eq!(recs[0].kind, RecommendationKind::Critical);
        assert!(recs[0].message.contains("2.38 MB"));
    }

    #[test]
    fn test_autoload_tiers() {
        let t = Thresholds::default().autoload;
        assert_eq!(ScoreCalculator::score_value(&t, 500_000.0), 100);
        assert_eq!(ScoreCalculator::score_value(&t, 500_001.0), 70);
        assert_eq!(ScoreCalculator::score_value(&t, 1_000_000.0), 70);
        assert_eq!(ScoreCalculator::score_value(&t, 2_000_000.0), 50);
        assert_eq!(ScoreCalculator::score_value(&t, 2_000_001.0), 30);
    }

    #[test]
    fn test_other_categories_have_no_fair_tier() {
        let t = Thresholds::default().sessions;
        assert_eq!(ScoreCalculator::score_value(&t, 100.0), 100);
        assert_eq!(ScoreCalculator::score_value(&t, 500.0), 70);
        assert_eq!(ScoreCalculator::score_value(&t, 501.0), 30);
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(ScoreLabel::from_score(100), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(80), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(79), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(79).color(), ScoreColor::Yellow);
        assert_eq!(ScoreLabel::from_score(60), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(59), ScoreLabel::NeedsAttention);
        assert_eq!(ScoreLabel::from_score(40), ScoreLabel::NeedsAttention);
        assert_eq!(ScoreLabel::from_score(39), ScoreLabel::Critical);
        assert_eq!(ScoreLabel::from_score(0).color(), ScoreColor::Red);
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(MetricStatus::from_score(90), MetricStatus::Excellent);
        assert_eq!(MetricStatus::from_score(89), MetricStatus::Good);
        assert_eq!(MetricStatus::from_score(70), MetricStatus::Good);
        assert_eq!(MetricStatus::from_score(50), MetricStatus::Warning);
        assert_eq!(MetricStatus::from_score(30), MetricStatus::Critical);
    }

    #[test]
    fn test_zero_total_weight_scores_zero() {
        let weights = Weights {
            autoload: 0.0,
            orphaned_meta: 0.0,
            expired_transients: 0.0,
            sessions: 0.0,
            meta_per_product: 0.0,
            revisions: 0.0,
        };
        let calc = ScoreCalculator::new(weights, Thresholds::default());
        let card = calc.calculate(&MetricSet::default());
        assert_eq!(card.score, 0);
        assert_eq!(card.label, ScoreLabel::Critical);
    }

    #[test]
    fn test_injected_weights() {
        let weights = Weights {
            autoload: 1.0,
            orphaned_meta: 0.0,
            expired_transients: 0.0,
            sessions: 0.0,
            meta_per_product: 0.0,
            revisions: 0.0,
        };
        let calc = ScoreCalculator::new(weights, Thresholds::default());
        let card = calc.calculate(&worked_example());
        assert_eq!(card.score, 30);
    }

    #[test]
    fn test_recommendation_kinds() {
        let metrics = MetricSet {
            autoload_size: 900_000,
            orphaned_postmeta: 2000,
            postmeta_rows: 10_000,
            expired_transients: 500,
            wc_sessions: 600,
            expired_wc_sessions: 100,
            meta_per_product: 150.0,
            total_revisions: 300,
            revisions_per_post: 30.0,
            ..Default::default()
        };
        let calc = ScoreCalculator::default();
        let card = calc.calculate(&metrics);
        let recs = calc.generate_recommendations(&metrics, &card.breakdown);

        let summary: Vec<(&str, RecommendationKind)> =
            recs.iter().map(|r| (r.area.as_str(), r.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("orphaned_meta", RecommendationKind::Critical),
                ("transients", RecommendationKind::Warning),
                ("sessions", RecommendationKind::Warning),
                ("product_meta", RecommendationKind::Info),
                ("revisions", RecommendationKind::Warning),
            ]
        );
        assert_eq!(recs[2].message, "Found 600 customer sessions (100 expired).");
        assert_eq!(recs[4].message, "Found 300 post revisions.");
    }

    #[test]
    fn test_breakdown_extras() {
        let calc = ScoreCalculator::default();
        let card = calc.calculate(&worked_example());

        let orphaned = &card.breakdown[&Category::OrphanedMeta];
        assert_eq!(orphaned.value, MetricValue::Int(50));
        assert_eq!(orphaned.display.as_deref(), Some("0.5%"));
        assert_eq!(
            card.breakdown[&Category::Autoload].display.as_deref(),
            Some("2.38 MB")
        );
        assert_eq!(card.breakdown[&Category::Sessions].expired, Some(0));
    }

    #[test]
    fn test_breakdown_serializes_with_category_keys() {
        let card = ScoreCalculator::default().calculate(&MetricSet::default());
        let json = serde_json::to_value(&card.breakdown).unwrap();
        assert!(json.get("wc_sessions").is_some());
        assert_eq!(json["autoload"]["status"], "excellent");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
    }

    proptest! {
        #[test]
        fn prop_category_score_non_increasing(a in 0.0f64..5_000_000.0, b in 0.0f64..5_000_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let thresholds = Thresholds::default();
            for category in Category::ALL {
                let t = thresholds.get(category);
                prop_assert!(ScoreCalculator::score_value(t, lo) >= ScoreCalculator::score_value(t, hi));
            }
        }

        #[test]
        fn prop_final_score_in_range(
            autoload in 0i64..10_000_000,
            orphaned in 0i64..10_000,
            rows in 0i64..10_000,
            transients in 0i64..1_000,
            sessions in 0i64..2_000,
            meta in 0.0f64..500.0,
            revisions in 0.0f64..100.0,
            w in proptest::collection::vec(0.0f64..10.0, 6),
        ) {
            prop_assume!(w.iter().sum::<f64>() > 0.0);
            let weights = Weights {
                autoload: w[0],
                orphaned_meta: w[1],
                expired_transients: w[2],
                sessions: w[3],
                meta_per_product: w[4],
                revisions: w[5],
            };
            let metrics = MetricSet {
                autoload_size: autoload,
                orphaned_postmeta: orphaned,
                postmeta_rows: rows,
                expired_transients: transients,
                wc_sessions: sessions,
                meta_per_product: meta,
                revisions_per_post: revisions,
                ..Default::default()
            };
            let card = ScoreCalculator::new(weights, Thresholds::default()).calculate(&metrics);
            prop_assert!(card.score <= 100);
            prop_assert!(card.score >= 30);
            prop_assert_eq!(card.label, ScoreLabel::from_score(card.score));
        }
    }
}
