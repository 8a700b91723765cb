//! Normalization strategies and the rule that picks between them.
//!
//! Two strategies map a winsorized value onto the 0-100 display scale:
//!
//! - **Z-score**: `50 + z * z_scale`, clamped, where `z` is negated for
//!   lower-is-better metrics.
//! - **Percentile rank**: `100 * rank / n` with average ranks for ties,
//!   ranked descending for lower-is-better metrics.
//!
//! Under [`StrategySelector::Auto`] the choice is made per cohort and metric
//! and recorded as a [`StrategyDecision`], so the switch is data rather than
//! a side effect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vantage_traits::stats::{coefficient_of_variation, quartile_dispersion};
use vantage_traits::{Direction, Result, SCORE_MAX, SCORE_MIDPOINT, SCORE_MIN, StrategyKind, VantageError};

/// Requested normalization for a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategySelector {
    /// Choose per cohort from the observed dispersion.
    #[default]
    Auto,
    /// Always use z-scores, flagging clustered output.
    ZScore,
    /// Always use percentile ranks.
    PercentileRank,
}

/// Configuration for normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Strategy used when a metric has no override (default: auto)
    pub default_strategy: StrategySelector,

    /// Per-metric strategy overrides
    pub per_metric: BTreeMap<String, StrategySelector>,

    /// Display points per standard deviation (default: 50/3, so +-3 sigma spans the scale)
    pub z_scale: f64,

    /// Cohort coefficient of variation below which auto picks percentile rank (default: 0.20)
    pub cv_threshold: f64,

    /// Output quartile dispersion below which z-scores count as clustered (default: 0.08)
    pub clustering_threshold: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            default_strategy: StrategySelector::Auto,
            per_metric: BTreeMap::new(),
            z_scale: SCORE_MIDPOINT / 3.0,
            cv_threshold: 0.20,
            clustering_threshold: 0.08,
        }
    }
}

impl NormalizationConfig {
    /// The selector that applies to `metric`.
    #[must_use]
    pub fn selector_for(&self, metric: &str) -> StrategySelector {
        self.per_metric
            .get(metric)
            .copied()
            .unwrap_or(self.default_strategy)
    }

    /// Reject non-positive scale and negative thresholds.
    pub fn validate(&self) -> Result<()> {
        if !self.z_scale.is_finite() || self.z_scale <= 0.0 {
            return Err(VantageError::Configuration(format!(
                "normalization.z_scale must be positive, got {}",
                self.z_scale
            )));
        }
        for (name, value) in [
            ("cv_threshold", self.cv_threshold),
            ("clustering_threshold", self.clustering_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(VantageError::Configuration(format!(
                    "normalization.{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Why a strategy was chosen for a cohort and metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionReason {
    /// Fixed by configuration.
    Configured,
    /// Raw coefficient of variation fell below the threshold.
    LowDispersion {
        /// Observed coefficient of variation.
        cv: f64,
    },
    /// Z-score output piled up near the midpoint.
    OutputClustered {
        /// Observed quartile dispersion of the z-score output.
        dispersion: f64,
    },
    /// Dispersion was adequate for z-scores.
    Dispersed {
        /// Observed coefficient of variation, if the mean was non-zero.
        cv: Option<f64>,
    },
}

/// The strategy applied to one cohort and metric, and why.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyDecision {
    /// Strategy applied.
    pub strategy: StrategyKind,
    /// Reason for the choice.
    pub reason: DecisionReason,
}

impl StrategyDecision {
    /// Whether auto selection moved away from z-scores.
    #[must_use]
    pub const fn is_switch(&self) -> bool {
        matches!(
            self.reason,
            DecisionReason::LowDispersion { .. } | DecisionReason::OutputClustered { .. }
        )
    }
}

/// Direction-adjusted z-score.
#[must_use]
pub fn z_score(value: f64, mean: f64, std: f64, direction: Direction) -> f64 {
    direction.sign() * (value - mean) / std
}

/// Map a z-score onto the display scale.
#[must_use]
pub fn z_display(z: f64, z_scale: f64) -> f64 {
    (SCORE_MIDPOINT + z * z_scale).clamp(SCORE_MIN, SCORE_MAX)
}

/// Percentile rank of `value` within an ascending reference distribution.
///
/// Ties share their average rank. For lower-is-better metrics the rank is
/// counted from the top, so the smallest value gets the highest percentile.
/// The best value scores 100 and the worst `100 / n`.
#[must_use]
pub fn percentile_rank(sorted: &[f64], value: f64, direction: Direction) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return SCORE_MIDPOINT;
    }
    let below = sorted.partition_point(|x| *x < value);
    let not_above = sorted.partition_point(|x| *x <= value);
    let ties = not_above - below;
    let above = n - not_above;

    let better = match direction {
        Direction::HigherIsBetter => below,
        Direction::LowerIsBetter => above,
    };
    let rank = better as f64 + (ties as f64 + 1.0) / 2.0;
    (100.0 * rank / n as f64).clamp(SCORE_MIN, SCORE_MAX)
}

/// Choose a strategy for one cohort and metric.
///
/// `reference` holds the winsorized reference values; `mean` and `std` are
/// their moments. Returns the decision and whether z-score output was found
/// clustered, which matters when z-scores are forced by configuration.
pub fn decide(
    selector: StrategySelector,
    reference: &[f64],
    mean: f64,
    std: f64,
    direction: Direction,
    config: &NormalizationConfig,
) -> (StrategyDecision, Option<f64>) {
    match selector {
        StrategySelector::PercentileRank => (
            StrategyDecision {
                strategy: StrategyKind::PercentileRank,
                reason: DecisionReason::Configured,
            },
            None,
        ),
        StrategySelector::ZScore => (
            StrategyDecision {
                strategy: StrategyKind::ZScore,
                reason: DecisionReason::Configured,
            },
            output_dispersion(reference, mean, std, direction, config.z_scale),
        ),
        StrategySelector::Auto => {
            let cv = coefficient_of_variation(mean, std);
            if let Some(cv) = cv.filter(|cv| *cv < config.cv_threshold) {
                return (
                    StrategyDecision {
                        strategy: StrategyKind::PercentileRank,
                        reason: DecisionReason::LowDispersion { cv },
                    },
                    None,
                );
            }
            let dispersion = output_dispersion(reference, mean, std, direction, config.z_scale);
            match dispersion {
                Some(d) if d < config.clustering_threshold => (
                    StrategyDecision {
                        strategy: StrategyKind::PercentileRank,
                        reason: DecisionReason::OutputClustered { dispersion: d },
                    },
                    dispersion,
                ),
                _ => (
                    StrategyDecision {
                        strategy: StrategyKind::ZScore,
                        reason: DecisionReason::Dispersed { cv },
                    },
                    dispersion,
                ),
            }
        }
    }
}

/// Quartile dispersion of the z-score display values of `reference`.
fn output_dispersion(
    reference: &[f64],
    mean: f64,
    std: f64,
    direction: Direction,
    z_scale: f64,
) -> Option<f64> {
    let outputs: Vec<f64> = reference
        .iter()
        .map(|v| z_display(z_score(*v, mean, std, direction), z_scale))
        .collect();
    quartile_dispersion(&outputs)
}
