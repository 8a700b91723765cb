//! Factor, metric and normalization vocabulary shared across the engine.
//!
//! A [`FactorCalculator`] turns the normalized metrics of one entity into a
//! single [`FactorScore`]. Calculators are pure and thread-safe so the
//! pipeline can score entities in parallel.

use crate::{Result, Score, VantageError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The seven scoring factors.
///
/// Ordering follows declaration order and is used for every map keyed by
/// factor, which keeps persisted output stable across runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// Profitability and balance-sheet strength.
    #[display("quality")]
    Quality,
    /// Cheapness relative to fundamentals.
    #[display("value")]
    Value,
    /// Revenue, earnings and cash-flow growth.
    #[display("growth")]
    Growth,
    /// Trailing price returns.
    #[display("momentum")]
    Momentum,
    /// Return in excess of a benchmark.
    #[display("relative_strength")]
    RelativeStrength,
    /// Ownership and short-interest structure.
    #[display("positioning")]
    Positioning,
    /// Analyst and news sentiment.
    #[display("sentiment")]
    Sentiment,
}

impl FactorKind {
    /// All factors in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Quality,
        Self::Value,
        Self::Growth,
        Self::Momentum,
        Self::RelativeStrength,
        Self::Positioning,
        Self::Sentiment,
    ];

    /// Snake-case identifier used in config files and output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Value => "value",
            Self::Growth => "growth",
            Self::Momentum => "momentum",
            Self::RelativeStrength => "relative_strength",
            Self::Positioning => "positioning",
            Self::Sentiment => "sentiment",
        }
    }

    /// One-line description for terminal output.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Quality => "Profitability, margins and leverage",
            Self::Value => "Valuation multiples and cash yields",
            Self::Growth => "Revenue, earnings and free cash flow growth",
            Self::Momentum => "Trailing total returns",
            Self::RelativeStrength => "Returns in excess of the benchmark",
            Self::Positioning => "Institutional, insider and short positioning",
            Self::Sentiment => "Analyst consensus, revisions and news tone",
        }
    }
}

impl FromStr for FactorKind {
    type Err = VantageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown factor: {s}").into())
    }
}

/// Whether a larger raw value is better or worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger raw values score higher.
    #[display("higher_is_better")]
    HigherIsBetter,
    /// Smaller raw values score higher; the metric is inverted before scoring.
    #[display("lower_is_better")]
    LowerIsBetter,
}

impl Direction {
    /// Whether normalization must invert this metric.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        matches!(self, Self::LowerIsBetter)
    }

    /// `1.0` or `-1.0`, applied to deviations before scaling.
    #[must_use]
    pub const fn sign(&self) -> f64 {
        match self {
            Self::HigherIsBetter => 1.0,
            Self::LowerIsBetter => -1.0,
        }
    }
}

/// Concrete normalization applied to a metric within a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `50 + z * scale`, clamped to `[0, 100]`.
    #[display("z_score")]
    ZScore,
    /// `100 * rank / n` with average ranks for ties.
    #[display("percentile_rank")]
    PercentileRank,
}

/// A metric the engine normalizes, with its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric name as it appears in [`RawMetricSet`](crate::RawMetricSet).
    pub name: String,
    /// Whether higher or lower raw values are better.
    pub direction: Direction,
}

impl MetricSpec {
    /// Create a new metric spec.
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }
}

/// One entity's normalized value for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScore {
    /// Metric name.
    pub metric: String,
    /// The raw input, if present.
    pub raw: Option<f64>,
    /// The raw input after winsorization.
    pub winsorized: Option<f64>,
    /// Direction-adjusted z-score, when the z-score strategy was applied.
    pub z: Option<f64>,
    /// Whether the metric was inverted (lower is better).
    pub inverted: bool,
    /// Strategy used, absent when the metric was unavailable for the cohort.
    pub strategy: Option<StrategyKind>,
    /// The 0-100 display value, or why it is unavailable.
    pub score: Score,
}

impl NormalizedScore {
    /// A score without normalization details, as for a metric that is
    /// unavailable for this entity.
    pub fn new(metric: impl Into<String>, raw: Option<f64>, score: Score) -> Self {
        Self {
            metric: metric.into(),
            raw,
            winsorized: None,
            z: None,
            inverted: false,
            strategy: None,
            score,
        }
    }
}

/// All normalized metrics for one entity, keyed by metric name.
pub type NormalizedMetrics = BTreeMap<String, NormalizedScore>;

/// A component metric of a factor with its relative weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorComponent {
    /// Metric name.
    pub metric: String,
    /// Relative weight, not necessarily summing to one.
    pub weight: f64,
}

impl FactorComponent {
    /// Create a new component.
    pub fn new(metric: impl Into<String>, weight: f64) -> Self {
        Self {
            metric: metric.into(),
            weight,
        }
    }
}

/// A component that contributed to a factor score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Metric name.
    pub metric: String,
    /// Normalized 0-100 value of the metric.
    pub value: f64,
    /// Weight after renormalizing over available components.
    pub weight: f64,
}

/// Score for one factor of one entity, with its drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Which factor.
    pub factor: FactorKind,
    /// The factor value or why it is unavailable.
    pub score: Score,
    /// Components that contributed, empty when unavailable.
    pub contributions: Vec<Contribution>,
}

/// Computes one factor from an entity's normalized metrics.
///
/// Implementations must be pure: the same metrics always produce the same
/// score, and no state is shared between entities.
pub trait FactorCalculator: Send + Sync {
    /// Which factor this calculator produces.
    fn kind(&self) -> FactorKind;

    /// Component metrics and their weights.
    fn components(&self) -> &[FactorComponent];

    /// Score an entity from its normalized metrics.
    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore;
}
