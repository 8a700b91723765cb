//! Positioning factor.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Component metrics of the positioning factor.
pub const POSITIONING_METRICS: [&str; 5] = [
    "institutional_ownership_pct",
    "insider_ownership_pct",
    "short_interest_pct",
    "institutional_ownership_change",
    "days_to_cover",
];

/// Ownership and short-interest structure.
#[derive(Debug, Clone)]
pub struct Positioning {
    components: Vec<FactorComponent>,
}

impl Positioning {
    /// Create a positioning calculator with optional per-metric weight overrides.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>) -> Result<Self> {
        let components = apply_overrides(
            FactorKind::Positioning,
            equal_components(POSITIONING_METRICS),
            overrides,
        )?;
        Ok(Self { components })
    }
}

impl Default for Positioning {
    fn default() -> Self {
        Self {
            components: equal_components(POSITIONING_METRICS),
        }
    }
}

impl FactorCalculator for Positioning {
    fn kind(&self) -> FactorKind {
        FactorKind::Positioning
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}
