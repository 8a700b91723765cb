//! Quality factor: profitability, margins and balance-sheet strength.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Component metrics of the quality factor.
pub const QUALITY_METRICS: [&str; 6] = [
    "return_on_equity",
    "return_on_assets",
    "gross_margin",
    "operating_margin",
    "debt_to_equity",
    "interest_coverage",
];

/// Quality factor calculator.
///
/// Blends return on capital, margins and leverage. `debt_to_equity` is a
/// lower-is-better metric and arrives here already inverted.
#[derive(Debug, Clone)]
pub struct Quality {
    components: Vec<FactorComponent>,
}

impl Quality {
    /// Create a quality calculator with optional per-metric weight overrides.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>) -> Result<Self> {
        let components = apply_overrides(
            FactorKind::Quality,
            equal_components(QUALITY_METRICS),
            overrides,
        )?;
        Ok(Self { components })
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            components: equal_components(QUALITY_METRICS),
        }
    }
}

impl FactorCalculator for Quality {
    fn kind(&self) -> FactorKind {
        FactorKind::Quality
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}
