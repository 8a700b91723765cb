//! The composite weight vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vantage_traits::{FactorKind, Result, VantageError};

/// Relative weight of each factor in the composite.
///
/// Factors absent from the map carry zero weight. Weights need not sum to
/// one; combiners renormalize over the factors that are available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeWeights(BTreeMap<FactorKind, f64>);

impl Default for CompositeWeights {
    fn default() -> Self {
        Self(
            [
                (FactorKind::Momentum, 0.20),
                (FactorKind::Growth, 0.18),
                (FactorKind::RelativeStrength, 0.17),
                (FactorKind::Value, 0.15),
                (FactorKind::Quality, 0.15),
                (FactorKind::Positioning, 0.10),
                (FactorKind::Sentiment, 0.05),
            ]
            .into_iter()
            .collect(),
        )
    }
}

impl CompositeWeights {
    /// Build from explicit weights, validating them.
    pub fn new(weights: BTreeMap<FactorKind, f64>) -> Result<Self> {
        let weights = Self(weights);
        weights.validate()?;
        Ok(weights)
    }

    /// Reject negative or non-finite weights and a non-positive total.
    pub fn validate(&self) -> Result<()> {
        for (kind, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(VantageError::Configuration(format!(
                    "composite weight for {kind} must be a non-negative number, got {weight}"
                )));
            }
        }
        let total = self.total();
        if total <= 0.0 {
            return Err(VantageError::Configuration(format!(
                "composite weights must sum to a positive value, got {total}"
            )));
        }
        Ok(())
    }

    /// Weight of one factor, zero if unlisted.
    #[must_use]
    pub fn get(&self, kind: FactorKind) -> f64 {
        self.0.get(&kind).copied().unwrap_or(0.0)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Iterate over listed factors and weights.
    pub fn iter(&self) -> impl Iterator<Item = (FactorKind, f64)> + '_ {
        self.0.iter().map(|(k, w)| (*k, *w))
    }
}
