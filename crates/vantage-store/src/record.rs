//! Persisted score records.
//!
//! Records hold only ordered collections, so serializing the same run twice
//! produces identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vantage_traits::{Date, FactorKind, Score, StrategyKind, Symbol};

/// Drill-down value of one metric behind a factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Metric name.
    pub metric: String,
    /// Raw input value, if present.
    pub raw: Option<f64>,
    /// Normalized 0-100 value or why it is unavailable.
    pub normalized: Score,
    /// Renormalized weight within the factor, if the metric contributed.
    pub weight: Option<f64>,
    /// Strategy used to normalize the metric.
    pub strategy: Option<StrategyKind>,
    /// Whether the metric was inverted.
    pub inverted: bool,
}

/// One factor of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    /// Factor value or why it is unavailable.
    pub score: Score,
    /// Component metrics behind the factor.
    pub metrics: Vec<MetricRecord>,
}

/// Scores of one entity for one as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Entity identifier.
    pub symbol: Symbol,
    /// As-of date.
    pub as_of: Date,
    /// Label of the cohort the entity was scored against.
    pub cohort: String,
    /// The seven factor scores.
    pub factors: BTreeMap<FactorKind, FactorRecord>,
    /// Composite score.
    pub composite: Score,
    /// Weight each factor received in the composite.
    pub composite_weights: BTreeMap<FactorKind, f64>,
}

/// Every record of one run, keyed by as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFile {
    /// As-of date.
    pub as_of: Date,
    /// Records sorted by symbol.
    pub records: Vec<ScoreRecord>,
}

impl ScoreFile {
    /// Create a file, sorting records by symbol.
    #[must_use]
    pub fn new(as_of: Date, mut records: Vec<ScoreRecord>) -> Self {
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Self { as_of, records }
    }

    /// Look up a record by symbol.
    pub fn get(&self, symbol: &str) -> Option<&ScoreRecord> {
        self.records
            .binary_search_by(|r| r.symbol.as_str().cmp(symbol))
            .ok()
            .map(|i| &self.records[i])
    }
}
