#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Sector-relative normalization for the vantage scoring engine.
//!
//! The pipeline inside this crate runs in a fixed order:
//!
//! 1. [`cohort`]: group entities by sector, pooling small sectors
//! 2. [`winsorize`]: clamp each metric to percentile thresholds per cohort
//! 3. [`statistics`]: freeze the per-cohort distributions
//! 4. [`strategy`]: map each value to 0-100 by z-score or percentile rank
//!
//! [`Normalizer`] ties the steps together for a whole universe.

use serde::{Deserialize, Serialize};
use vantage_traits::Result;

pub mod cohort;
pub mod engine;
pub mod statistics;
pub mod strategy;
pub mod winsorize;

pub use cohort::{Cohort, CohortConfig, CohortFallback, CohortLabel, FallbackPolicy, Grouping};
pub use engine::{DecisionRecord, NormalizedEntity, NormalizedUniverse, Normalizer, SkippedMetric};
pub use statistics::{CohortStatistics, MetricState, MetricStatistics};
pub use strategy::{DecisionReason, NormalizationConfig, StrategyDecision, StrategySelector};
pub use winsorize::{Thresholds, WinsorizeConfig};

/// Configuration for every normalization stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Sector grouping
    pub cohort: CohortConfig,

    /// Outlier suppression
    pub winsorize: WinsorizeConfig,

    /// Strategy selection and display scaling
    pub normalization: NormalizationConfig,
}

impl NormalizerConfig {
    /// Validate every stage.
    pub fn validate(&self) -> Result<()> {
        self.cohort.validate()?;
        self.winsorize.validate()?;
        self.normalization.validate()
    }
}
