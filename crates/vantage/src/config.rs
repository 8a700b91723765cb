//! Run configuration.
//!
//! [`ScoringConfig`] aggregates every component's configuration. It loads
//! from JSON, with every key optional, and is validated once before any
//! computation starts.
//!
//! ```json
//! {
//!   "cohort": { "min_size": 5, "fallback": "universe_wide" },
//!   "winsorize": { "lower": 0.01, "upper": 0.99, "min_observations": 3 },
//!   "normalization": { "default_strategy": "auto", "per_metric": { "pe_ratio": "percentile_rank" } },
//!   "factors": { "weight_overrides": { "value": { "pe_ratio": 2.0 } } },
//!   "composite": { "weights": { "momentum": 0.2, "growth": 0.18 } },
//!   "as_of": "2024-06-28"
//! }
//! ```

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use vantage_combine::{Combiner, CompositeWeights, EqualWeightCombiner, RenormalizedCombiner};
use vantage_factors::{FactorConfig, FactorSet};
use vantage_normalize::NormalizerConfig;
use vantage_store::BoundaryPolicy;
use vantage_traits::types::parse_date;
use vantage_traits::{Date, Result, VantageError};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "VANTAGE_CONFIG";

/// Environment variable overriding the as-of date.
pub const AS_OF_ENV: &str = "VANTAGE_AS_OF";

/// Which composite combiner to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinerKind {
    /// Canonical weights, renormalized over available factors.
    #[default]
    Renormalized,
    /// Plain average of available factors.
    EqualWeight,
}

/// Configuration for the composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Factor weights (default: momentum 20%, growth 18%, relative strength 17%,
    /// value 15%, quality 15%, positioning 10%, sentiment 5%)
    pub weights: CompositeWeights,

    /// Combination strategy (default: renormalized)
    pub combiner: CombinerKind,
}

impl CompositeConfig {
    /// Build the configured combiner.
    pub fn build(&self) -> Box<dyn Combiner> {
        match self.combiner {
            CombinerKind::Renormalized => Box::new(RenormalizedCombiner::new(self.weights.clone())),
            CombinerKind::EqualWeight => Box::new(EqualWeightCombiner::new()),
        }
    }
}

/// Complete configuration of a scoring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Cohort, winsorization and normalization settings
    #[serde(flatten)]
    pub normalizer: NormalizerConfig,

    /// Factor calculator settings
    pub factors: FactorConfig,

    /// Composite settings
    pub composite: CompositeConfig,

    /// Timeouts and retries at the repository and persistence boundaries
    pub boundary: BoundaryPolicy,

    /// As-of date (default: today)
    pub as_of: Option<Date>,
}

impl ScoringConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VantageError::Configuration(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VantageError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Build configuration from the environment.
    ///
    /// Reads the file named by `VANTAGE_CONFIG` if set, otherwise starts
    /// from defaults, then applies `VANTAGE_AS_OF`. This will also load
    /// from a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(as_of) = env::var(AS_OF_ENV) {
            config.as_of = Some(parse_date(&as_of)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject any configuration that could not produce a valid run.
    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        self.composite.weights.validate()?;
        FactorSet::from_config(&self.factors).map(|_| ())
    }

    /// The configured as-of date, or today's local date.
    #[must_use]
    pub fn resolve_as_of(&self) -> Date {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_normalize::{FallbackPolicy, StrategySelector};
    use vantage_traits::FactorKind;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.normalizer.cohort.min_size, 5);
        assert_eq!(config.normalizer.winsorize.min_observations, 3);
        assert_eq!(config.composite.combiner, CombinerKind::Renormalized);
        assert!(config.as_of.is_none());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ScoringConfig::from_json(
            r#"{
                "cohort": { "min_size": 8, "fallback": "merge_small" },
                "normalization": { "per_metric": { "pe_ratio": "z_score" } },
                "composite": { "weights": { "momentum": 1.0, "value": 1.0 } },
                "as_of": "2024-06-28"
            }"#,
        )
        .unwrap();

        assert_eq!(config.normalizer.cohort.min_size, 8);
        assert_eq!(config.normalizer.cohort.fallback, FallbackPolicy::MergeSmall);
        assert_eq!(
            config.normalizer.normalization.selector_for("pe_ratio"),
            StrategySelector::ZScore
        );
        assert_eq!(config.composite.weights.get(FactorKind::Growth), 0.0);
        assert_eq!(
            config.resolve_as_of(),
            Date::from_ymd_opt(2024, 6, 28).unwrap()
        );
        assert!((config.normalizer.winsorize.upper - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_negative_weight_is_configuration_error() {
        let err = ScoringConfig::from_json(r#"{ "composite": { "weights": { "value": -1.0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, VantageError::Configuration(_)));
    }

    #[test]
    fn test_zero_weight_sum_is_configuration_error() {
        let err = ScoringConfig::from_json(
            r#"{ "composite": { "weights": { "value": 0.0, "quality": 0.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::Configuration(_)));
    }

    #[test]
    fn test_invalid_percentiles_are_configuration_error() {
        let err =
            ScoringConfig::from_json(r#"{ "winsorize": { "lower": 0.99, "upper": 0.01 } }"#)
                .unwrap_err();
        assert!(matches!(err, VantageError::Configuration(_)));
    }

    #[test]
    fn test_unknown_override_metric_is_configuration_error() {
        let err = ScoringConfig::from_json(
            r#"{ "factors": { "weight_overrides": { "quality": { "pe_ratio": 1.0 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, VantageError::Configuration(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ScoringConfig::from_json("{ not json"),
            Err(VantageError::Configuration(_))
        ));
    }

    #[test]
    fn test_serialize_round_trip_keys() {
        let json = serde_json::to_value(ScoringConfig::default()).unwrap();
        for key in ["cohort", "winsorize", "normalization", "factors", "composite", "boundary"] {
            assert!(json.get(key).is_some(), "{key}");
        }
    }
}
