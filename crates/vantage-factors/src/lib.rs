//! Factor calculators for the vantage scoring engine.
//!
//! This crate provides one calculator per factor:
//! - Quality: return on capital, margins, leverage
//! - Value: valuation multiples and cash yields
//! - Growth: single-year growth, plus gated multi-year CAGR
//! - Momentum: trailing returns across four windows
//! - Relative strength: returns in excess of a benchmark
//! - Positioning: ownership and short interest
//! - Sentiment: analyst consensus, revisions and news
//!
//! Each factor is the weighted mean of whichever normalized component
//! metrics are available, with weights renormalized over those.
//!
//! # Example
//!
//! ```ignore
//! use vantage_factors::{FactorConfig, FactorSet};
//! use vantage_factors::registry::available_metrics;
//!
//! let factors = FactorSet::from_config(&FactorConfig::default())?;
//! let scores = factors.score_entity(&normalized_metrics);
//!
//! // Discover available metrics
//! let metrics = available_metrics();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod aggregate;
pub mod registry;

mod growth;
mod momentum;
mod positioning;
mod quality;
mod relative_strength;
mod sentiment;
mod set;
mod value;

#[cfg(test)]
mod testing;

pub use growth::{GROWTH_METRICS, Growth, MULTI_YEAR_GROWTH_METRICS};
pub use momentum::{MOMENTUM_METRICS, Momentum};
pub use positioning::{POSITIONING_METRICS, Positioning};
pub use quality::{QUALITY_METRICS, Quality};
pub use registry::{MetricInfo, available_metrics, get_metric_info, metrics_by_factor};
pub use relative_strength::{
    BenchmarkReturns, RelativeStrength, RelativeStrengthConfig, derive_excess_returns,
};
pub use sentiment::{SENTIMENT_METRICS, Sentiment};
pub use set::{FactorConfig, FactorSet};
pub use value::{VALUE_METRICS, Value};
