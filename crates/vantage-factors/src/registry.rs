//! Metric registry for discovering and categorizing scored metrics.
//!
//! Every metric the engine understands is listed here with its owning
//! factor and direction. Directions drive inversion during normalization.

use serde::Serialize;
use vantage_traits::{Direction, FactorKind};

/// Metadata about a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricInfo {
    /// Unique identifier for the metric
    pub name: &'static str,

    /// Factor the metric feeds
    pub factor: FactorKind,

    /// Whether higher or lower raw values are better
    pub direction: Direction,

    /// Human-readable description
    pub description: &'static str,

    /// Whether the engine derives the metric rather than reading it
    pub derived: bool,

    /// Whether the metric spans several fiscal years and is feature-gated
    pub multi_year: bool,

    /// Inclusive bounds a well-formed raw value must fall within
    pub valid_range: Option<(f64, f64)>,
}

impl MetricInfo {
    /// Restrict raw values to `[min, max]`.
    const fn within(self, min: f64, max: f64) -> Self {
        Self {
            valid_range: Some((min, max)),
            ..self
        }
    }

    /// Whether `value` lies within the metric's valid range.
    ///
    /// Metrics without a declared range accept any value.
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        self.valid_range
            .is_none_or(|(min, max)| (min..=max).contains(&value))
    }
}

const fn metric(
    name: &'static str,
    factor: FactorKind,
    direction: Direction,
    description: &'static str,
) -> MetricInfo {
    MetricInfo {
        name,
        factor,
        direction,
        description,
        derived: false,
        multi_year: false,
        valid_range: None,
    }
}

const fn derived(name: &'static str, description: &'static str) -> MetricInfo {
    MetricInfo {
        derived: true,
        ..metric(
            name,
            FactorKind::RelativeStrength,
            Direction::HigherIsBetter,
            description,
        )
    }
}

const fn multi_year(name: &'static str, description: &'static str) -> MetricInfo {
    MetricInfo {
        multi_year: true,
        ..metric(
            name,
            FactorKind::Growth,
            Direction::HigherIsBetter,
            description,
        )
    }
}

use Direction::{HigherIsBetter as Higher, LowerIsBetter as Lower};
use FactorKind::{Growth, Momentum, Positioning, Quality, Sentiment, Value};

const METRICS: &[MetricInfo] = &[
    // Quality
    metric("return_on_equity", Quality, Higher, "Net income relative to shareholder equity"),
    metric("return_on_assets", Quality, Higher, "Net income relative to total assets"),
    metric("gross_margin", Quality, Higher, "Gross profit relative to revenue"),
    metric("operating_margin", Quality, Higher, "Operating income relative to revenue"),
    metric("debt_to_equity", Quality, Lower, "Total debt relative to shareholder equity"),
    metric("interest_coverage", Quality, Higher, "EBIT relative to interest expense"),
    // Value
    metric("pe_ratio", Value, Lower, "Price relative to trailing earnings per share").within(0.0, f64::MAX),
    metric("pb_ratio", Value, Lower, "Price relative to book value per share"),
    metric("ps_ratio", Value, Lower, "Price relative to trailing revenue per share").within(0.0, f64::MAX),
    metric("ev_to_ebitda", Value, Lower, "Enterprise value relative to EBITDA"),
    metric("fcf_yield", Value, Higher, "Free cash flow relative to market cap"),
    metric("dividend_yield", Value, Higher, "Trailing dividends relative to price"),
    // Growth
    metric("revenue_growth_yoy", Growth, Higher, "Year-over-year revenue growth"),
    metric("eps_growth_yoy", Growth, Higher, "Year-over-year diluted EPS growth"),
    metric("fcf_growth_yoy", Growth, Higher, "Year-over-year free cash flow growth"),
    multi_year("revenue_cagr_3y", "Three-year compound annual revenue growth"),
    multi_year("eps_cagr_3y", "Three-year compound annual EPS growth"),
    // Momentum
    metric("return_1m", Momentum, Higher, "1-month total return"),
    metric("return_3m", Momentum, Higher, "3-month total return"),
    metric("return_6m", Momentum, Higher, "6-month total return"),
    metric("return_12m_ex_1m", Momentum, Higher, "12-month total return skipping the last month"),
    // Relative strength
    derived("excess_return_1m", "1-month return minus the benchmark's"),
    derived("excess_return_3m", "3-month return minus the benchmark's"),
    derived("excess_return_6m", "6-month return minus the benchmark's"),
    derived("excess_return_12m_ex_1m", "12-1 month return minus the benchmark's"),
    // Positioning
    metric("institutional_ownership_pct", Positioning, Higher, "Share of float held by institutions").within(0.0, 100.0),
    metric("insider_ownership_pct", Positioning, Higher, "Share of shares held by insiders").within(0.0, 100.0),
    metric("short_interest_pct", Positioning, Lower, "Shares sold short relative to float").within(0.0, 100.0),
    metric("institutional_ownership_change", Positioning, Higher, "Quarter-over-quarter change in institutional ownership"),
    metric("days_to_cover", Positioning, Lower, "Short interest relative to average daily volume").within(0.0, f64::MAX),
    // Sentiment
    metric("analyst_consensus", Sentiment, Higher, "Mean analyst rating, 1 (sell) to 5 (buy)").within(1.0, 5.0),
    metric("eps_revision_30d", Sentiment, Higher, "30-day change in consensus EPS estimate"),
    metric("news_sentiment", Sentiment, Higher, "Average news tone over the last 30 days"),
    metric("price_target_upside", Sentiment, Higher, "Consensus price target relative to price"),
];

/// Prefix of derived excess-return metrics.
pub const EXCESS_PREFIX: &str = "excess_";

/// Get information about all available metrics.
#[must_use]
pub fn available_metrics() -> Vec<MetricInfo> {
    METRICS.to_vec()
}

/// Get all metrics feeding a specific factor.
#[must_use]
pub fn metrics_by_factor(factor: &FactorKind) -> Vec<MetricInfo> {
    METRICS
        .iter()
        .filter(|info| &info.factor == factor)
        .copied()
        .collect()
}

/// Get information about a specific metric by name.
#[must_use]
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    METRICS.iter().find(|info| info.name == name).copied()
}

/// Name of the excess-return metric derived from a return window.
#[must_use]
pub fn excess_metric_name(window: &str) -> String {
    format!("{EXCESS_PREFIX}{window}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = METRICS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), METRICS.len());
    }

    #[test]
    fn test_every_factor_has_metrics() {
        for kind in FactorKind::ALL {
            assert!(!metrics_by_factor(&kind).is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_get_metric_info() {
        let pe = get_metric_info("pe_ratio").unwrap();
        assert_eq!(pe.factor, Value);
        assert_eq!(pe.direction, Lower);
        assert!(get_metric_info("nonexistent").is_none());
    }

    #[test]
    fn test_multi_year_growth_is_gated() {
        let gated: Vec<_> = metrics_by_factor(&Growth)
            .into_iter()
            .filter(|m| m.multi_year)
            .map(|m| m.name)
            .collect();
        assert_eq!(gated, vec!["revenue_cagr_3y", "eps_cagr_3y"]);

        // single-year growth must say so in its name
        for m in metrics_by_factor(&Growth).into_iter().filter(|m| !m.multi_year) {
            assert!(m.name.ends_with("_yoy"), "{}", m.name);
        }
    }

    #[test]
    fn test_valid_ranges() {
        let consensus = get_metric_info("analyst_consensus").unwrap();
        assert_eq!(consensus.valid_range, Some((1.0, 5.0)));
        assert!(consensus.accepts(1.0));
        assert!(consensus.accepts(4.5));
        assert!(!consensus.accepts(9.0));

        let short = get_metric_info("short_interest_pct").unwrap();
        assert!(short.accepts(0.0));
        assert!(!short.accepts(-5.0));
        assert!(!short.accepts(100.5));

        let pe = get_metric_info("pe_ratio").unwrap();
        assert!(pe.accepts(8249.0));
        assert!(!pe.accepts(-12.0));

        // unbounded metrics accept anything finite
        let growth = get_metric_info("revenue_growth_yoy").unwrap();
        assert!(growth.valid_range.is_none());
        assert!(growth.accepts(-3.0));

        for m in METRICS {
            if let Some((min, max)) = m.valid_range {
                assert!(min < max, "{}", m.name);
            }
        }
    }

    #[test]
    fn test_excess_metrics_derived_from_momentum_windows() {
        for m in metrics_by_factor(&FactorKind::RelativeStrength) {
            assert!(m.derived);
            let window = m.name.strip_prefix(EXCESS_PREFIX).unwrap();
            assert_eq!(get_metric_info(window).unwrap().factor, Momentum);
        }
    }
}
