//! Growth factor: revenue, earnings and free cash flow growth.
//!
//! Single-year growth metrics carry a `_yoy` suffix. The three-year CAGR
//! metrics are only components when multi-year growth is enabled, because
//! upstream feeds have been known to fill them from a single fiscal year.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Single-year growth metrics, always components.
pub const GROWTH_METRICS: [&str; 3] = ["revenue_growth_yoy", "eps_growth_yoy", "fcf_growth_yoy"];

/// Multi-year growth metrics, components only when enabled.
pub const MULTI_YEAR_GROWTH_METRICS: [&str; 2] = ["revenue_cagr_3y", "eps_cagr_3y"];

/// Growth factor calculator.
#[derive(Debug, Clone)]
pub struct Growth {
    components: Vec<FactorComponent>,
    multi_year: bool,
}

impl Growth {
    /// Create a growth calculator.
    ///
    /// Overrides naming a multi-year metric are rejected unless
    /// `multi_year` is enabled.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>, multi_year: bool) -> Result<Self> {
        let components = apply_overrides(
            FactorKind::Growth,
            Self::default_components(multi_year),
            overrides,
        )?;
        Ok(Self {
            components,
            multi_year,
        })
    }

    /// Whether the CAGR metrics are included.
    #[must_use]
    pub const fn multi_year_enabled(&self) -> bool {
        self.multi_year
    }

    fn default_components(multi_year: bool) -> Vec<FactorComponent> {
        if multi_year {
            equal_components(GROWTH_METRICS.into_iter().chain(MULTI_YEAR_GROWTH_METRICS))
        } else {
            equal_components(GROWTH_METRICS)
        }
    }
}

impl Default for Growth {
    fn default() -> Self {
        Self {
            components: Self::default_components(false),
            multi_year: false,
        }
    }
}

impl FactorCalculator for Growth {
    fn kind(&self) -> FactorKind {
        FactorKind::Growth
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}
