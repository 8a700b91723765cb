//! Run diagnostics and summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use vantage_normalize::{CohortFallback, DecisionRecord, SkippedMetric};
use vantage_store::ScoreRecord;
use vantage_traits::{Date, FactorKind, VantageError};

/// An entity or cohort excluded from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Symbol or cohort label.
    pub entity: String,
    /// What was wrong.
    pub detail: String,
}

impl From<&VantageError> for Violation {
    fn from(error: &VantageError) -> Self {
        match error {
            VantageError::ContractViolation { entity, detail } => Self {
                entity: entity.clone(),
                detail: detail.clone(),
            },
            other => Self {
                entity: String::new(),
                detail: other.to_string(),
            },
        }
    }
}

/// Everything noteworthy that happened while scoring, other than the scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Sector groups scored against the broad market.
    pub fallbacks: Vec<CohortFallback>,
    /// Metrics unavailable for a whole cohort.
    pub skipped: Vec<SkippedMetric>,
    /// Normalization strategy per cohort and metric.
    pub decisions: Vec<DecisionRecord>,
    /// Excluded entities and cohorts.
    pub violations: Vec<Violation>,
    /// Whether no benchmark return was known for any window.
    pub benchmark_missing: bool,
}

impl RunDiagnostics {
    /// Decisions where auto selection moved to percentile ranks.
    pub fn strategy_switches(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.decisions.iter().filter(|d| d.decision.is_switch())
    }

    /// Decisions whose z-score output was flagged as clustered.
    pub fn clustered(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.decisions.iter().filter(|d| d.clustered)
    }
}

/// Headline counts of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// As-of date.
    pub as_of: Date,
    /// Entities with a score record.
    pub scored: usize,
    /// Entities and cohorts excluded by contract violations.
    pub excluded: usize,
    /// Sector groups that fell back to the broad market.
    pub fallbacks: usize,
    /// Cohort metrics switched to percentile ranks.
    pub strategy_switches: usize,
    /// Cohort metrics flagged as clustered.
    pub clustered: usize,
    /// Entities with an available score, per factor.
    pub factor_coverage: BTreeMap<FactorKind, usize>,
    /// Entities with an available composite.
    pub composite_available: usize,
}

impl RunSummary {
    /// Count the outcome of a run.
    pub fn new(as_of: Date, records: &[ScoreRecord], diagnostics: &RunDiagnostics) -> Self {
        let factor_coverage = FactorKind::ALL
            .into_iter()
            .map(|kind| {
                let available = records
                    .iter()
                    .filter(|r| r.factors.get(&kind).is_some_and(|f| f.score.is_available()))
                    .count();
                (kind, available)
            })
            .collect();

        Self {
            as_of,
            scored: records.len(),
            excluded: diagnostics.violations.len(),
            fallbacks: diagnostics.fallbacks.len(),
            strategy_switches: diagnostics.strategy_switches().count(),
            clustered: diagnostics.clustered().count(),
            factor_coverage,
            composite_available: records
                .iter()
                .filter(|r| r.composite.is_available())
                .count(),
        }
    }

    /// Emit the summary as a single structured log event.
    pub fn log(&self) {
        info!(
            as_of = %self.as_of,
            scored = self.scored,
            excluded = self.excluded,
            fallbacks = self.fallbacks,
            strategy_switches = self.strategy_switches,
            clustered = self.clustered,
            composite_available = self.composite_available,
            "Scoring run complete"
        );
    }
}
