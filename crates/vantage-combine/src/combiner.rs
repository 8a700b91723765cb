//! Core trait definition for composite combiners.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vantage_traits::score::in_range;
use vantage_traits::{FactorKind, Result, Score, VantageError};

/// Composite score of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// The blended value, or unavailable when no factor was.
    pub score: Score,

    /// Weight each available factor actually received, summing to one
    pub effective_weights: BTreeMap<FactorKind, f64>,
}

impl CompositeScore {
    /// A composite with no contributing factors.
    #[must_use]
    pub fn unavailable(score: Score) -> Self {
        Self {
            score,
            effective_weights: BTreeMap::new(),
        }
    }
}

/// Combines factor scores into a composite.
///
/// Missing factors are normal and never an error. Implementations return
/// an error only for structurally invalid input: an available factor score
/// that is non-finite or outside `[0, 100]`.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use vantage_combine::{Combiner, CompositeScore};
/// use vantage_traits::{FactorKind, Score, UnavailableReason};
///
/// struct AlwaysMissing;
///
/// impl Combiner for AlwaysMissing {
///     fn combine(&self, _: &BTreeMap<FactorKind, Score>) -> vantage_traits::Result<CompositeScore> {
///         Ok(CompositeScore::unavailable(Score::unavailable(UnavailableReason::NoFactors)))
///     }
///
///     fn name(&self) -> &str {
///         "always_missing"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Blend factor scores into a composite.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::InvalidData`] if an available factor score is
    /// non-finite or outside `[0, 100]`.
    fn combine(&self, factors: &BTreeMap<FactorKind, Score>) -> Result<CompositeScore>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}

/// Reject available factor scores that are not on the display scale.
pub(crate) fn check_factor_scores(factors: &BTreeMap<FactorKind, Score>) -> Result<()> {
    for (kind, score) in factors {
        if let Some(value) = score.value()
            && !in_range(value)
        {
            return Err(VantageError::InvalidData(format!(
                "{kind} factor score {value} is outside [0, 100]"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_factor_scores() {
        let ok: BTreeMap<_, _> = [(FactorKind::Value, Score::Available { value: 100.0 })]
            .into_iter()
            .collect();
        assert!(check_factor_scores(&ok).is_ok());

        let bad: BTreeMap<_, _> = [(FactorKind::Value, Score::Available { value: 101.0 })]
            .into_iter()
            .collect();
        assert!(matches!(
            check_factor_scores(&bad),
            Err(VantageError::InvalidData(_))
        ));

        let nan: BTreeMap<_, _> = [(FactorKind::Value, Score::Available { value: f64::NAN })]
            .into_iter()
            .collect();
        assert!(check_factor_scores(&nan).is_err());
    }
}
