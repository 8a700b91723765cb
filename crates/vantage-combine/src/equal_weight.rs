//! Equal-weighted composite.

use crate::combiner::{Combiner, CompositeScore, check_factor_scores};
use std::collections::BTreeMap;
use vantage_traits::{FactorKind, Result, Score, UnavailableReason};

/// Arithmetic mean of the available factor scores.
///
/// Ignores the canonical weight vector. Useful as a baseline when
/// comparing composites.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightCombiner;

impl EqualWeightCombiner {
    /// Create a new equal-weight combiner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Combiner for EqualWeightCombiner {
    fn combine(&self, factors: &BTreeMap<FactorKind, Score>) -> Result<CompositeScore> {
        check_factor_scores(factors)?;

        let available: Vec<(FactorKind, f64)> = factors
            .iter()
            .filter_map(|(kind, score)| score.value().map(|v| (*kind, v)))
            .collect();
        if available.is_empty() {
            return Ok(CompositeScore::unavailable(Score::unavailable(
                UnavailableReason::NoFactors,
            )));
        }

        let weight = 1.0 / available.len() as f64;
        let value = available.iter().map(|(_, v)| v * weight).sum();
        Ok(CompositeScore {
            score: Score::clamped(value),
            effective_weights: available.iter().map(|(k, _)| (*k, weight)).collect(),
        })
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}
