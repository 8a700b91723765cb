//! Composite combination strategies for vantage.
//!
//! This crate blends the seven factor scores of an entity into one
//! composite. The default [`RenormalizedCombiner`] applies the canonical
//! weight vector over whichever factors are available; the
//! [`EqualWeightCombiner`] averages them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use vantage_combine::{Combiner, RenormalizedCombiner};
//! use vantage_traits::{FactorKind, Score};
//!
//! let combiner = RenormalizedCombiner::default();
//! let factors: BTreeMap<FactorKind, Score> = [
//!     (FactorKind::Momentum, Score::Available { value: 72.0 }),
//!     (FactorKind::Value, Score::Available { value: 41.0 }),
//! ]
//! .into_iter()
//! .collect();
//!
//! let composite = combiner.combine(&factors).unwrap();
//! ```

mod combiner;
mod equal_weight;
mod renormalized;
mod weights;

// Re-export main types
pub use combiner::{Combiner, CompositeScore};
pub use equal_weight::EqualWeightCombiner;
pub use renormalized::RenormalizedCombiner;
pub use weights::CompositeWeights;
