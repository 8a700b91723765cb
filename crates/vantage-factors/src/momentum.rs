//! Momentum factor based on trailing total returns.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Return windows feeding momentum, shortest first.
pub const MOMENTUM_METRICS: [&str; 4] = ["return_1m", "return_3m", "return_6m", "return_12m_ex_1m"];

/// Momentum factor calculator.
///
/// The 12-month window skips the most recent month to avoid the short-term
/// reversal effect; that adjustment happens upstream when the metric is built.
#[derive(Debug, Clone)]
pub struct Momentum {
    components: Vec<FactorComponent>,
}

impl Momentum {
    /// Create a momentum calculator with optional per-metric weight overrides.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>) -> Result<Self> {
        let components = apply_overrides(
            FactorKind::Momentum,
            equal_components(MOMENTUM_METRICS),
            overrides,
        )?;
        Ok(Self { components })
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            components: equal_components(MOMENTUM_METRICS),
        }
    }
}

impl FactorCalculator for Momentum {
    fn kind(&self) -> FactorKind {
        FactorKind::Momentum
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::metrics;
    use approx::assert_relative_eq;

    #[test]
    fn test_momentum_all_windows() {
        let score = Momentum::default().score(&metrics(&[
            ("return_1m", Some(10.0)),
            ("return_3m", Some(20.0)),
            ("return_6m", Some(30.0)),
            ("return_12m_ex_1m", Some(40.0)),
        ]));
        assert_relative_eq!(score.score.value().unwrap(), 25.0);
        for c in &score.contributions {
            assert_relative_eq!(c.weight, 0.25);
        }
    }
}
