//! Cohort-parallel normalization of a whole universe.

use crate::NormalizerConfig;
use crate::cohort::{CohortFallback, CohortLabel, group_by_sector};
use crate::statistics::{CohortStatistics, MetricState};
use crate::strategy::StrategyDecision;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vantage_traits::{
    MetricSpec, NormalizedMetrics, RawMetricSet, Result, UnavailableReason, VantageError,
};

/// Normalized metrics for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntity {
    /// Index into the input slice.
    pub index: usize,
    /// Cohort the entity was scored against.
    pub cohort: CohortLabel,
    /// Normalized metrics keyed by name.
    pub metrics: NormalizedMetrics,
}

/// A metric that could not be scored for a whole cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMetric {
    /// Cohort label.
    pub cohort: String,
    /// Metric name.
    pub metric: String,
    /// Why it was skipped.
    pub reason: UnavailableReason,
}

/// The strategy used for one cohort and metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Cohort label.
    pub cohort: String,
    /// Metric name.
    pub metric: String,
    /// Strategy and reason.
    pub decision: StrategyDecision,
    /// Whether z-score output was flagged as clustered.
    pub clustered: bool,
}

/// Output of [`Normalizer::normalize_universe`].
#[derive(Debug, Default)]
pub struct NormalizedUniverse {
    /// One entry per entity whose cohort was scored, in input order.
    pub entities: Vec<NormalizedEntity>,
    /// Groups folded into broad market.
    pub fallbacks: Vec<CohortFallback>,
    /// Metrics unavailable for a whole cohort.
    pub skipped: Vec<SkippedMetric>,
    /// Strategy per cohort and metric.
    pub decisions: Vec<DecisionRecord>,
    /// Cohorts that could not be scored at all.
    pub violations: Vec<VantageError>,
}

/// Groups, winsorizes and normalizes a universe for one run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer, validating its configuration.
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize `metrics` for every entity.
    ///
    /// Cohort statistics are computed in parallel and fully materialized
    /// before any member is normalized against them.
    pub fn normalize_universe(
        &self,
        entities: &[RawMetricSet],
        metrics: &[MetricSpec],
    ) -> NormalizedUniverse {
        let grouping = group_by_sector(entities, &self.config.cohort);

        let statistics: Vec<(usize, Result<CohortStatistics>)> = grouping
            .cohorts
            .par_iter()
            .enumerate()
            .map(|(i, cohort)| {
                let reference: Vec<&RawMetricSet> =
                    cohort.reference.iter().map(|&r| &entities[r]).collect();
                let stats =
                    CohortStatistics::compute(cohort.label.clone(), &reference, metrics, &self.config);
                (i, stats)
            })
            .collect();

        let mut universe = NormalizedUniverse {
            fallbacks: grouping.fallbacks.clone(),
            ..Default::default()
        };

        let mut ready = Vec::with_capacity(statistics.len());
        for (i, stats) in statistics {
            match stats {
                Ok(stats) => {
                    self.record_cohort(&stats, &mut universe);
                    ready.push((i, stats));
                }
                Err(e) => {
                    warn!(error = %e, "Cohort could not be scored");
                    universe.violations.push(e);
                }
            }
        }

        let mut normalized: Vec<NormalizedEntity> = ready
            .par_iter()
            .flat_map_iter(|(i, stats)| {
                let cohort = &grouping.cohorts[*i];
                cohort.members.iter().map(move |&member| NormalizedEntity {
                    index: member,
                    cohort: cohort.label.clone(),
                    metrics: stats.normalize(&entities[member]),
                })
            })
            .collect();
        normalized.sort_by_key(|e| e.index);
        universe.entities = normalized;
        universe
    }

    fn record_cohort(&self, stats: &CohortStatistics, universe: &mut NormalizedUniverse) {
        let cohort = stats.label().to_string();
        debug!(
            cohort = %cohort,
            reference_size = stats.reference_size(),
            "Computed cohort statistics"
        );
        for (metric, state) in stats.metrics() {
            match state {
                MetricState::Unavailable(reason) => universe.skipped.push(SkippedMetric {
                    cohort: cohort.clone(),
                    metric: metric.to_string(),
                    reason: *reason,
                }),
                MetricState::Ready(m) => {
                    if m.decision.is_switch() {
                        info!(
                            cohort = %cohort,
                            metric,
                            strategy = %m.decision.strategy,
                            reason = ?m.decision.reason,
                            "Switched normalization strategy"
                        );
                    }
                    universe.decisions.push(DecisionRecord {
                        cohort: cohort.clone(),
                        metric: metric.to_string(),
                        decision: m.decision,
                        clustered: m.clustered,
                    });
                }
            }
        }
    }
}
