//! Weighted composite with renormalization over available factors.

use crate::combiner::{Combiner, CompositeScore, check_factor_scores};
use crate::weights::CompositeWeights;
use std::collections::BTreeMap;
use vantage_traits::{FactorKind, Result, Score, UnavailableReason};

/// Weighted blend of the available factors.
///
/// `composite = sum(w_i * s_i) / sum(w_i)` over available factors, so a
/// missing factor's weight is redistributed proportionally instead of
/// pulling the composite toward zero or the midpoint.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use vantage_combine::{Combiner, RenormalizedCombiner};
/// use vantage_traits::{FactorKind, Score};
///
/// let combiner = RenormalizedCombiner::default();
/// let factors: BTreeMap<_, _> = [(FactorKind::Quality, Score::Available { value: 80.0 })]
///     .into_iter()
///     .collect();
///
/// let composite = combiner.combine(&factors).unwrap();
/// assert_eq!(composite.score.value(), Some(80.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenormalizedCombiner {
    weights: CompositeWeights,
}

impl RenormalizedCombiner {
    /// Create a combiner with the given weights.
    #[must_use]
    pub const fn new(weights: CompositeWeights) -> Self {
        Self { weights }
    }

    /// The configured weight vector.
    #[must_use]
    pub const fn weights(&self) -> &CompositeWeights {
        &self.weights
    }
}

impl Combiner for RenormalizedCombiner {
    fn combine(&self, factors: &BTreeMap<FactorKind, Score>) -> Result<CompositeScore> {
        check_factor_scores(factors)?;

        let available: Vec<(FactorKind, f64, f64)> = factors
            .iter()
            .filter_map(|(kind, score)| score.value().map(|v| (*kind, v)))
            .map(|(kind, value)| (kind, self.weights.get(kind), value))
            .filter(|(_, weight, _)| *weight > 0.0)
            .collect();

        let total: f64 = available.iter().map(|(_, w, _)| w).sum();
        if available.is_empty() || total <= 0.0 {
            return Ok(CompositeScore::unavailable(Score::unavailable(
                UnavailableReason::NoFactors,
            )));
        }

        let effective_weights: BTreeMap<FactorKind, f64> = available
            .iter()
            .map(|(kind, weight, _)| (*kind, weight / total))
            .collect();
        let value: f64 = available
            .iter()
            .map(|(kind, _, value)| effective_weights[kind] * value)
            .sum();

        Ok(CompositeScore {
            score: Score::clamped(value),
            effective_weights,
        })
    }

    fn name(&self) -> &str {
        "renormalized"
    }
}
