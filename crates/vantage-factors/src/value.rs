//! Value factor: valuation multiples and cash yields.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Component metrics of the value factor.
pub const VALUE_METRICS: [&str; 6] = [
    "pe_ratio",
    "pb_ratio",
    "ps_ratio",
    "ev_to_ebitda",
    "fcf_yield",
    "dividend_yield",
];

/// Value factor calculator.
///
/// The four multiples are lower-is-better; the two yields are not.
#[derive(Debug, Clone)]
pub struct Value {
    components: Vec<FactorComponent>,
}

impl Value {
    /// Create a value calculator with optional per-metric weight overrides.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>) -> Result<Self> {
        let components =
            apply_overrides(FactorKind::Value, equal_components(VALUE_METRICS), overrides)?;
        Ok(Self { components })
    }
}

impl Default for Value {
    fn default() -> Self {
        Self {
            components: equal_components(VALUE_METRICS),
        }
    }
}

impl FactorCalculator for Value {
    fn kind(&self) -> FactorKind {
        FactorKind::Value
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}
