//! Relative strength: entity return minus benchmark return.
//!
//! The excess return is derived before normalization and then treated like
//! any other metric, so it is winsorized and ranked within the sector cohort.

use crate::aggregate::{apply_overrides, equal_components, weighted_mean};
use crate::registry::{excess_metric_name, get_metric_info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use vantage_traits::{
    FactorCalculator, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, RawMetricSet,
    Result, Score, UnavailableReason, VantageError,
};

/// Configuration for the relative strength factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeStrengthConfig {
    /// Symbol whose row supplies benchmark returns (default: "SPY")
    pub benchmark: String,

    /// Explicit benchmark returns per window, taking precedence over the benchmark row
    pub benchmark_returns: BTreeMap<String, f64>,

    /// Return windows compared against the benchmark (default: ["return_6m"])
    pub windows: Vec<String>,
}

impl Default for RelativeStrengthConfig {
    fn default() -> Self {
        Self {
            benchmark: "SPY".to_string(),
            benchmark_returns: BTreeMap::new(),
            windows: vec!["return_6m".to_string()],
        }
    }
}

impl RelativeStrengthConfig {
    /// Reject unknown windows and non-finite benchmark returns.
    pub fn validate(&self) -> Result<()> {
        if self.windows.is_empty() {
            return Err(VantageError::Configuration(
                "relative_strength.windows must name at least one return window".to_string(),
            ));
        }
        for window in &self.windows {
            match get_metric_info(window) {
                Some(info) if info.factor == FactorKind::Momentum => {}
                _ => {
                    return Err(VantageError::Configuration(format!(
                        "relative_strength window '{window}' is not a momentum return metric"
                    )));
                }
            }
        }
        for (window, value) in &self.benchmark_returns {
            if !value.is_finite() {
                return Err(VantageError::Configuration(format!(
                    "benchmark return for '{window}' must be finite"
                )));
            }
        }
        Ok(())
    }
}

/// Benchmark return per window for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkReturns {
    returns: BTreeMap<String, f64>,
}

impl BenchmarkReturns {
    /// Resolve benchmark returns from configuration and the benchmark's own row.
    ///
    /// Configured values win. Windows with neither source stay missing.
    pub fn resolve(config: &RelativeStrengthConfig, benchmark_row: Option<&RawMetricSet>) -> Self {
        let returns = config
            .windows
            .iter()
            .filter_map(|window| {
                config
                    .benchmark_returns
                    .get(window)
                    .copied()
                    .or_else(|| benchmark_row.and_then(|row| row.get(window)))
                    .filter(|v| v.is_finite())
                    .map(|v| (window.clone(), v))
            })
            .collect();
        Self { returns }
    }

    /// Benchmark return for a window.
    pub fn get(&self, window: &str) -> Option<f64> {
        self.returns.get(window).copied()
    }

    /// Whether no window has a benchmark return.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Add `excess_<window>` metrics to every entity.
///
/// The excess metric is absent when either the entity's or the benchmark's
/// return is missing. Each window without a benchmark is logged once.
pub fn derive_excess_returns(
    entities: &mut [RawMetricSet],
    config: &RelativeStrengthConfig,
    benchmark: &BenchmarkReturns,
) {
    for window in &config.windows {
        let name = excess_metric_name(window);
        let bench = benchmark.get(window);
        if bench.is_none() {
            warn!(
                window = %window,
                benchmark = %config.benchmark,
                "Benchmark return missing, relative strength unavailable for this window"
            );
        }
        for entity in entities.iter_mut() {
            let excess = entity.get(window).zip(bench).map(|(r, b)| r - b);
            entity.insert(name.clone(), excess);
        }
    }
}

/// Relative strength factor calculator.
#[derive(Debug, Clone)]
pub struct RelativeStrength {
    components: Vec<FactorComponent>,
}

impl RelativeStrength {
    /// Create a calculator for the configured windows.
    ///
    /// Weight overrides are keyed by the derived `excess_<window>` name.
    pub fn new(
        config: &RelativeStrengthConfig,
        overrides: Option<&BTreeMap<String, f64>>,
    ) -> Result<Self> {
        config.validate()?;
        let names: Vec<String> = config
            .windows
            .iter()
            .map(|w| excess_metric_name(w))
            .collect();
        let components = apply_overrides(
            FactorKind::RelativeStrength,
            equal_components(names.iter().map(String::as_str)),
            overrides,
        )?;
        Ok(Self { components })
    }

    /// The factor score reported when no benchmark return is known.
    #[must_use]
    pub const fn missing_benchmark() -> FactorScore {
        FactorScore {
            factor: FactorKind::RelativeStrength,
            score: Score::unavailable(UnavailableReason::MissingBenchmark),
            contributions: Vec::new(),
        }
    }
}

impl FactorCalculator for RelativeStrength {
    fn kind(&self) -> FactorKind {
        FactorKind::RelativeStrength
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
    use approx::assert_relative_eq;
    use vantage_traits::Date;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_resolve_prefers_configured_returns() {
        let mut config = RelativeStrengthConfig::default();
        config
            .benchmark_returns
            .insert("return_6m".to_string(), 0.05);
        let row = RawMetricSet::new("SPY", date()).with_metric("return_6m", 0.08);

        let resolved = BenchmarkReturns::resolve(&config, Some(&row));
        assert_eq!(resolved.get("return_6m"), Some(0.05));

        let from_row = BenchmarkReturns::resolve(&RelativeStrengthConfig::default(), Some(&row));
        assert_eq!(from_row.get("return_6m"), Some(0.08));
    }

    #[test]
    fn test_derive_excess_returns() {
        let config = RelativeStrengthConfig::default();
        let row = RawMetricSet::new("SPY", date()).with_metric("return_6m", 0.10);
        let benchmark = BenchmarkReturns::resolve(&config, Some(&row));

        let mut entities = vec![
            RawMetricSet::new("AAPL", date()).with_metric("return_6m", 0.25),
            RawMetricSet::new("XOM", date()).with_missing("return_6m"),
        ];
        derive_excess_returns(&mut entities, &config, &benchmark);

        assert_relative_eq!(entities[0].get("excess_return_6m").unwrap(), 0.15);
        assert_eq!(entities[1].get("excess_return_6m"), None);
        assert!(entities[1].metrics.contains_key("excess_return_6m"));
    }

    #[test]
    fn test_missing_benchmark_leaves_excess_absent() {
        let config = RelativeStrengthConfig::default();
        let benchmark = BenchmarkReturns::resolve(&config, None);
        assert!(benchmark.is_empty());

        let mut entities = vec![RawMetricSet::new("AAPL", date()).with_metric("return_6m", 0.25)];
        derive_excess_returns(&mut entities, &config, &benchmark);
        assert_eq!(entities[0].get("excess_return_6m"), None);

        let score = RelativeStrength::missing_benchmark();
        assert_eq!(
            score.score.reason(),
            Some(UnavailableReason::MissingBenchmark)
        );
    }

    #[test]
    fn test_components_follow_windows() {
        let config = RelativeStrengthConfig {
            windows: vec!["return_3m".to_string(), "return_12m_ex_1m".to_string()],
            ..Default::default()
        };
        let calc = RelativeStrength::new(&config, None).unwrap();
        let names: Vec<_> = calc.components().iter().map(|c| c.metric.as_str()).collect();
        assert_eq!(names, vec!["excess_return_3m", "excess_return_12m_ex_1m"]);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let config = RelativeStrengthConfig {
            windows: vec!["pe_ratio".to_string()],
            ..Default::default()
        };
        assert!(RelativeStrength::new(&config, None).is_err());
        assert!(
            RelativeStrengthConfig {
                windows: Vec::new(),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }
}
