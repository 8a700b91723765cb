#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # vantage
//!
//! Sector-relative factor scoring for equities.
//!
//! vantage turns raw per-company metrics into 0-100 scores on seven factors
//! and a weighted composite. Every metric is judged against the company's
//! sector peers, with outliers clamped before they can distort the scale.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vantage::prelude::*;
//!
//! # async fn example() -> vantage::store::Result<()> {
//! let config = ScoringConfig::from_env()?;
//! let as_of = config.resolve_as_of();
//! let engine = ScoringEngine::new(config)?;
//!
//! let repository = CsvMetricRepository::from_env()?;
//! let writer = JsonScoreWriter::from_env()?;
//! let run = engine.run(&repository, &writer, as_of).await?;
//!
//! for record in &run.records {
//!     println!("{} {}", record.symbol, record.composite);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared vocabulary ([`Score`], [`FactorKind`], [`RawMetricSet`])
//! - [`normalize`] - Cohorts, winsorization and normalization strategies
//! - [`factors`] - Metric registry and the seven factor calculators
//! - [`combine`] - Composite combiners and weights
//! - [`store`] - Metric repositories and score persistence
//!
//! ## Architecture
//!
//! 1. **Validation** excludes malformed entities
//! 2. **Normalization** scores each metric within its sector cohort
//! 3. **Factors** average their available component metrics
//! 4. **Composite** blends available factors with renormalized weights
//! 5. **Persistence** writes one record per entity with full drill-down

/// Version information for the vantage crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod validate;

#[cfg(test)]
mod scenarios;

pub use config::{CombinerKind, CompositeConfig, ScoringConfig};
pub use diagnostics::{RunDiagnostics, RunSummary, Violation};
pub use pipeline::{ScoringEngine, ScoringRun};

// ============================================================================
// Core Types
// ============================================================================

/// Shared types and traits.
///
/// - [`Score`] - A 0-100 value or the reason it is unavailable
/// - [`FactorCalculator`] - Computes one factor from normalized metrics
/// - [`RawMetricSet`] - Raw metrics of one entity
pub mod traits {
    pub use vantage_traits::*;
}

pub use vantage_traits::{
    Date, FactorCalculator, FactorKind, RawMetricSet, Result, Score, Symbol, UnavailableReason,
    VantageError,
};

// ============================================================================
// Normalization
// ============================================================================

/// Sector-relative normalization.
///
/// ## Stages
///
/// - **Cohorts**: sector groups, with small sectors pooled into a broad market
/// - **Winsorization**: clamp each metric to cohort percentiles
/// - **Strategies**: z-score or percentile rank, chosen per cohort and metric
pub mod normalize {
    pub use vantage_normalize::*;
}

// ============================================================================
// Factors
// ============================================================================

/// Factor calculators and the metric registry.
///
/// # Example
///
/// ```ignore
/// use vantage::factors::{available_metrics, metrics_by_factor};
/// use vantage::FactorKind;
///
/// let value_metrics = metrics_by_factor(&FactorKind::Value);
/// ```
pub mod factors {
    pub use vantage_factors::*;
}

// ============================================================================
// Composite
// ============================================================================

/// Composite combiners.
///
/// - **RenormalizedCombiner**: canonical weights, rescaled over available factors
/// - **EqualWeightCombiner**: plain average of available factors
pub mod combine {
    pub use vantage_combine::*;
}

// ============================================================================
// Storage
// ============================================================================

/// Repository and persistence boundaries.
pub mod store {
    pub use vantage_store::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use vantage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Date, FactorKind, RawMetricSet, Result, RunDiagnostics, Score, ScoringConfig,
        ScoringEngine, ScoringRun, UnavailableReason, VantageError,
    };
    pub use vantage_combine::{Combiner, CompositeWeights};
    pub use vantage_store::{
        CsvMetricRepository, InMemoryRepository, JsonScoreWriter, MetricRepository, ScoreSink,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_re_exports() {
        let metrics = factors::available_metrics();
        for kind in FactorKind::ALL {
            assert!(metrics.iter().any(|m| m.factor == kind), "{kind}");
        }
        let pe = factors::get_metric_info("pe_ratio").unwrap();
        assert_eq!(pe.factor, FactorKind::Value);
        assert!(normalize::NormalizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_error_types() {
        let err = VantageError::contract("AAPL", "duplicate");
        assert!(!err.is_fatal());
        let err: VantageError = "boom".into();
        assert!(err.is_fatal());
    }
}
