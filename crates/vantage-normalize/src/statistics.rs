//! Immutable per-cohort distributions.
//!
//! [`CohortStatistics`] is computed once per cohort from its reference
//! entities and then shared read-only by every member's normalization.
//! Nothing in here mutates after construction.

use crate::NormalizerConfig;
use crate::cohort::CohortLabel;
use crate::strategy::{StrategyDecision, decide, percentile_rank, z_display, z_score};
use crate::winsorize::{Thresholds, winsorize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use vantage_traits::stats::summarize;
use vantage_traits::{
    Direction, MetricSpec, NormalizedMetrics, NormalizedScore, RawMetricSet, Result, Score,
    StrategyKind, UnavailableReason, VantageError,
};

/// Distribution of one metric within one cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStatistics {
    /// Metric direction.
    pub direction: Direction,
    /// Number of non-missing reference values.
    pub observations: usize,
    /// Winsorization bounds.
    pub thresholds: Thresholds,
    /// Mean of the winsorized values.
    pub mean: f64,
    /// Sample standard deviation of the winsorized values.
    pub std: f64,
    /// Strategy applied and why.
    pub decision: StrategyDecision,
    /// Quartile dispersion of z-score output, when it was computed.
    pub output_dispersion: Option<f64>,
    /// Whether z-score output was found clustered near the midpoint.
    pub clustered: bool,
    z_scale: f64,
    sorted: Vec<f64>,
}

impl MetricStatistics {
    /// Winsorized reference values in ascending order.
    pub fn sorted_reference(&self) -> &[f64] {
        &self.sorted
    }

    /// Normalize one raw value against this distribution.
    pub fn normalize(&self, metric: &str, raw: f64) -> NormalizedScore {
        let winsorized = self.thresholds.clamp(raw);
        let (z, score) = match self.decision.strategy {
            StrategyKind::ZScore => {
                let z = z_score(winsorized, self.mean, self.std, self.direction);
                (Some(z), Score::clamped(z_display(z, self.z_scale)))
            }
            StrategyKind::PercentileRank => (
                None,
                Score::clamped(percentile_rank(&self.sorted, winsorized, self.direction)),
            ),
        };
        NormalizedScore {
            metric: metric.to_string(),
            raw: Some(raw),
            winsorized: Some(winsorized),
            z,
            inverted: self.direction.is_inverted(),
            strategy: Some(self.decision.strategy),
            score,
        }
    }
}

/// Whether a metric can be scored in a cohort.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricState {
    /// The metric has a usable distribution.
    Ready(Box<MetricStatistics>),
    /// The metric is unavailable for every member of the cohort.
    Unavailable(UnavailableReason),
}

/// Immutable distributions for every metric of one cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortStatistics {
    label: CohortLabel,
    reference_size: usize,
    metrics: BTreeMap<String, MetricState>,
}

impl CohortStatistics {
    /// Compute statistics for `metrics` over the reference entities.
    ///
    /// An empty reference set is a contract violation for the cohort.
    pub fn compute(
        label: CohortLabel,
        reference: &[&RawMetricSet],
        metrics: &[MetricSpec],
        config: &NormalizerConfig,
    ) -> Result<Self> {
        if reference.is_empty() {
            return Err(VantageError::contract(label.to_string(), "empty cohort"));
        }

        let states = metrics
            .iter()
            .map(|spec| {
                let values: Vec<f64> = reference
                    .iter()
                    .filter_map(|entity| entity.get(&spec.name))
                    .filter(|v| v.is_finite())
                    .collect();
                let state = metric_state(&label, spec, values, config);
                (spec.name.clone(), state)
            })
            .collect();

        Ok(Self {
            label,
            reference_size: reference.len(),
            metrics: states,
        })
    }

    /// Cohort identity.
    pub const fn label(&self) -> &CohortLabel {
        &self.label
    }

    /// Number of entities in the reference distribution.
    pub const fn reference_size(&self) -> usize {
        self.reference_size
    }

    /// State of one metric.
    pub fn metric(&self, name: &str) -> Option<&MetricState> {
        self.metrics.get(name)
    }

    /// All metric states in name order.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, &MetricState)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Normalize every configured metric for one member entity.
    pub fn normalize(&self, entity: &RawMetricSet) -> NormalizedMetrics {
        self.metrics
            .iter()
            .map(|(name, state)| {
                let raw = entity.get(name).filter(|v| v.is_finite());
                let normalized = match (state, raw) {
                    (MetricState::Unavailable(reason), _) => {
                        NormalizedScore::new(name, raw, Score::unavailable(*reason))
                    }
                    (MetricState::Ready(_), None) => NormalizedScore::new(
                        name,
                        None,
                        Score::unavailable(UnavailableReason::MissingInput),
                    ),
                    (MetricState::Ready(stats), Some(value)) => stats.normalize(name, value),
                };
                (name.clone(), normalized)
            })
            .collect()
    }
}

fn metric_state(
    label: &CohortLabel,
    spec: &MetricSpec,
    mut values: Vec<f64>,
    config: &NormalizerConfig,
) -> MetricState {
    let observations = values.len();
    if observations < config.winsorize.min_observations.max(1) {
        debug!(
            cohort = %label,
            metric = %spec.name,
            observations,
            "Skipping metric: too few observations"
        );
        return MetricState::Unavailable(UnavailableReason::InsufficientObservations);
    }

    let Some(thresholds) = winsorize(&mut values, &config.winsorize) else {
        return MetricState::Unavailable(UnavailableReason::InsufficientObservations);
    };
    values.sort_by(f64::total_cmp);

    let summary = match summarize(&values) {
        Some(s) if s.has_dispersion() => s,
        _ => {
            debug!(
                cohort = %label,
                metric = %spec.name,
                observations,
                "Skipping metric: degenerate distribution"
            );
            return MetricState::Unavailable(UnavailableReason::DegenerateDistribution);
        }
    };

    let normalization = &config.normalization;
    let selector = normalization.selector_for(&spec.name);
    let (decision, output_dispersion) = decide(
        selector,
        &values,
        summary.mean,
        summary.std,
        spec.direction,
        normalization,
    );
    let clustered = decision.strategy == StrategyKind::ZScore
        && output_dispersion.is_some_and(|d| d < normalization.clustering_threshold);
    if clustered {
        warn!(
            cohort = %label,
            metric = %spec.name,
            dispersion = output_dispersion,
            "Z-score output clusters around the midpoint"
        );
    }

    MetricState::Ready(Box::new(MetricStatistics {
        direction: spec.direction,
        observations,
        thresholds,
        mean: summary.mean,
        std: summary.std,
        decision,
        output_dispersion,
        clustered,
        z_scale: normalization.z_scale,
        sorted: values,
    }))
}
