//! Sentiment factor.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use std::collections::BTreeMap;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result,
};

/// Component metrics of the sentiment factor.
pub const SENTIMENT_METRICS: [&str; 4] = [
    "analyst_consensus",
    "eps_revision_30d",
    "news_sentiment",
    "price_target_upside",
];

/// Analyst and news sentiment.
#[derive(Debug, Clone)]
pub struct Sentiment {
    components: Vec<FactorComponent>,
}

impl Sentiment {
    /// Create a sentiment calculator with optional per-metric weight overrides.
    pub fn new(overrides: Option<&BTreeMap<String, f64>>) -> Result<Self> {
        let components = apply_overrides(
            FactorKind::Sentiment,
            equal_components(SENTIMENT_METRICS),
            overrides,
        )?;
        Ok(Self { components })
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            components: equal_components(SENTIMENT_METRICS),
        }
    }
}

impl FactorCalculator for Sentiment {
    fn kind(&self) -> FactorKind {
        FactorKind::Sentiment
    }

    fn components(&self) -> &[FactorComponent] {
        &self.components
    }

    fn score(&self, metrics: &NormalizedMetrics) -> FactorScore {
        weighted_mean(self.kind(), &self.components, metrics)
    }
}
