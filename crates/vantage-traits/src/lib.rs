#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the vantage scoring engine.
//!
//! This crate provides the shared vocabulary of the engine: raw metric
//! input, the bounded [`Score`] with its explicit unavailable state, the
//! seven [`FactorKind`]s, the [`FactorCalculator`] trait and the error type.

/// The version of the vantage-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod factor;
pub mod score;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, VantageError};
pub use factor::{
    Contribution, Direction, FactorCalculator, FactorComponent, FactorKind, FactorScore,
    MetricSpec, NormalizedMetrics, NormalizedScore, StrategyKind,
};
pub use score::{SCORE_MAX, SCORE_MIDPOINT, SCORE_MIN, Score, UnavailableReason};
pub use types::{Date, MetricFrame, RawMetricSet, Symbol};
