//! The full set of factor calculators for one deployment.

use crate::registry::get_metric_info;
use crate::{Growth, Momentum, Positioning, Quality, RelativeStrength, RelativeStrengthConfig, Sentiment, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use vantage_traits::{
    Direction, FactorCalculator, FactorKind, FactorScore, MetricSpec, NormalizedMetrics, Result,
    VantageError,
};

/// Configuration for the factor calculators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Per-factor metric weight overrides; unlisted components keep weight 1
    pub weight_overrides: BTreeMap<FactorKind, BTreeMap<String, f64>>,

    /// Include three-year CAGR metrics in growth (default: false)
    pub enable_multi_year_growth: bool,

    /// Relative strength windows and benchmark
    pub relative_strength: RelativeStrengthConfig,
}

/// All seven calculators, built once and shared across entities.
pub struct FactorSet {
    calculators: Vec<Box<dyn FactorCalculator>>,
}

impl fmt::Debug for FactorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorSet")
            .field(
                "factors",
                &self.calculators.iter().map(|c| c.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FactorSet {
    /// Build the calculators, validating every weight override.
    pub fn from_config(config: &FactorConfig) -> Result<Self> {
        let overrides = |kind: FactorKind| config.weight_overrides.get(&kind);
        let calculators: Vec<Box<dyn FactorCalculator>> = vec![
            Box::new(Quality::new(overrides(FactorKind::Quality))?),
            Box::new(Value::new(overrides(FactorKind::Value))?),
            Box::new(Growth::new(
                overrides(FactorKind::Growth),
                config.enable_multi_year_growth,
            )?),
            Box::new(Momentum::new(overrides(FactorKind::Momentum))?),
            Box::new(RelativeStrength::new(
                &config.relative_strength,
                overrides(FactorKind::RelativeStrength),
            )?),
            Box::new(Positioning::new(overrides(FactorKind::Positioning))?),
            Box::new(Sentiment::new(overrides(FactorKind::Sentiment))?),
        ];
        Ok(Self { calculators })
    }

    /// The calculators in canonical factor order.
    pub fn calculators(&self) -> &[Box<dyn FactorCalculator>] {
        &self.calculators
    }

    /// Every metric some calculator consumes, with its direction.
    pub fn metric_specs(&self) -> Result<Vec<MetricSpec>> {
        let mut specs: BTreeMap<&str, Direction> = BTreeMap::new();
        for calculator in &self.calculators {
            for component in calculator.components() {
                let info = get_metric_info(&component.metric).ok_or_else(|| {
                    VantageError::Configuration(format!(
                        "metric '{}' is not registered",
                        component.metric
                    ))
                })?;
                specs.insert(info.name, info.direction);
            }
        }
        Ok(specs
            .into_iter()
            .map(|(name, direction)| MetricSpec::new(name, direction))
            .collect())
    }

    /// Score every factor for one entity.
    pub fn score_entity(&self, metrics: &NormalizedMetrics) -> BTreeMap<FactorKind, FactorScore> {
        self.calculators
            .iter()
            .map(|c| (c.kind(), c.score(metrics)))
            .collect()
    }
}
