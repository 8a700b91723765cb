//! Outlier suppression by percentile clamping.

use serde::{Deserialize, Serialize};
use vantage_traits::{Result, VantageError};

/// Tolerance applied before rounding percentile positions to indices.
const INDEX_EPSILON: f64 = 1e-9;

/// Configuration for winsorization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinsorizeConfig {
    /// Lower percentile threshold as a fraction (default: 0.01)
    pub lower: f64,

    /// Upper percentile threshold as a fraction (default: 0.99)
    pub upper: f64,

    /// Fewest non-missing values a cohort needs before a metric is scored (default: 3)
    pub min_observations: usize,
}

impl Default for WinsorizeConfig {
    fn default() -> Self {
        Self {
            lower: 0.01,
            upper: 0.99,
            min_observations: 3,
        }
    }
}

impl WinsorizeConfig {
    /// Reject bounds outside `0 <= lower < upper <= 1`.
    pub fn validate(&self) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(VantageError::Configuration(
                "winsorize bounds must be finite".to_string(),
            ));
        }
        if self.lower < 0.0 || self.upper > 1.0 || self.lower >= self.upper {
            return Err(VantageError::Configuration(format!(
                "winsorize bounds must satisfy 0 <= lower < upper <= 1, got lower={} upper={}",
                self.lower, self.upper
            )));
        }
        if self.min_observations == 0 {
            return Err(VantageError::Configuration(
                "winsorize.min_observations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Clamp bounds computed for one cohort and metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Values below this are raised to it.
    pub lower: f64,
    /// Values above this are lowered to it.
    pub upper: f64,
}

impl Thresholds {
    /// Clamp a single value.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Compute thresholds from ascending, finite values.
    ///
    /// The bounds are the order statistics at ranks `ceil(lower * (n - 1))`
    /// and `floor(upper * (n - 1))`, so both thresholds are observed values
    /// and an extreme value is pulled to the nearest value inside the band.
    /// When the band collapses (small `n`) the full range is kept and
    /// nothing is clamped. Returns `None` for empty input.
    ///
    /// With the default 1%/99% bounds and `4 <= n <= 101`, the ranks land on
    /// the second-smallest and second-largest values. The minimum and
    /// maximum are then clamped onto their neighbours and tie with them, so
    /// the two best (and the two worst) entities share a score.
    pub fn from_sorted(sorted: &[f64], lower: f64, upper: f64) -> Option<Self> {
        let last = sorted.len().checked_sub(1)?;
        let span = last as f64;
        let mut lo = ((lower * span) - INDEX_EPSILON).ceil().max(0.0) as usize;
        let mut hi = ((upper * span) + INDEX_EPSILON).floor().max(0.0) as usize;
        hi = hi.min(last);
        if lo >= hi {
            lo = 0;
            hi = last;
        }
        Some(Self {
            lower: sorted[lo],
            upper: sorted[hi],
        })
    }
}

/// Winsorize the finite entries of `values` in place.
///
/// Non-finite entries are left untouched and do not participate in the
/// thresholds. Returns the thresholds used, or `None` if there were no
/// finite values.
///
/// # Examples
///
/// ```
/// use vantage_normalize::winsorize::{winsorize, WinsorizeConfig};
///
/// let mut pe = vec![8249.0, 22.0, 19.0, 25.0, 21.0];
/// let thresholds = winsorize(&mut pe, &WinsorizeConfig::default()).unwrap();
/// assert_eq!(thresholds.upper, 25.0);
/// assert_eq!(pe[0], 25.0);
/// ```
pub fn winsorize(values: &mut [f64], config: &WinsorizeConfig) -> Option<Thresholds> {
    let mut sorted: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    sorted.sort_by(f64::total_cmp);
    let thresholds = Thresholds::from_sorted(&sorted, config.lower, config.upper)?;

    for v in values.iter_mut() {
        if v.is_finite() {
            *v = thresholds.clamp(*v);
        }
    }
    Some(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_outlier_is_clamped_to_band() {
        let mut values = vec![8249.0, 22.0, 19.0, 25.0, 21.0];
        let thresholds = winsorize(&mut values, &WinsorizeConfig::default()).unwrap();

        assert_relative_eq!(thresholds.lower, 21.0);
        assert_relative_eq!(thresholds.upper, 25.0);
        assert_eq!(values, vec![25.0, 22.0, 21.0, 25.0, 21.0]);
    }

    #[test]
    fn test_winsorize_is_idempotent() {
        let config = WinsorizeConfig::default();
        let mut values: Vec<f64> = (0..200).map(|i| f64::from(i * i) - 500.0).collect();
        values.push(1e9);
        values.push(-1e9);

        winsorize(&mut values, &config);
        let once = values.clone();
        winsorize(&mut values, &config);
        assert_eq!(values, once);
    }

    #[test]
    fn test_small_sample_is_not_clamped() {
        let mut values = vec![1.0, 100.0, 1000.0];
        let thresholds = winsorize(&mut values, &WinsorizeConfig::default()).unwrap();
        assert_relative_eq!(thresholds.lower, 1.0);
        assert_relative_eq!(thresholds.upper, 1000.0);
        assert_eq!(values, vec![1.0, 100.0, 1000.0]);
    }

    #[test]
    fn test_extremes_tie_with_neighbours() {
        let mut roe: Vec<f64> = (0..=10).map(|i| 0.10 + 0.01 * f64::from(i)).collect();
        let thresholds = winsorize(&mut roe, &WinsorizeConfig::default()).unwrap();

        assert_relative_eq!(thresholds.lower, 0.11, epsilon = 1e-12);
        assert_relative_eq!(thresholds.upper, 0.19, epsilon = 1e-12);
        assert_eq!(roe[0], roe[1]);
        assert_eq!(roe[9], roe[10]);
        assert!(roe[8] < roe[9]);
    }

    #[test]
    fn test_large_sample_thresholds() {
        let mut values: Vec<f64> = (0..=1000).map(f64::from).collect();
        let thresholds = winsorize(&mut values, &WinsorizeConfig::default()).unwrap();
        assert_relative_eq!(thresholds.lower, 10.0);
        assert_relative_eq!(thresholds.upper, 990.0);
        assert_relative_eq!(values[0], 10.0);
        assert_relative_eq!(values[1000], 990.0);
        assert_relative_eq!(values[500], 500.0);
    }

    #[test]
    fn test_missing_values_do_not_participate() {
        let mut values = vec![f64::NAN, 1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN];
        winsorize(&mut values, &WinsorizeConfig::default());
        assert!(values[0].is_nan());
        assert!(values[6].is_nan());
    }

    #[test]
    fn test_empty_input() {
        let mut values: Vec<f64> = vec![f64::NAN];
        assert!(winsorize(&mut values, &WinsorizeConfig::default()).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(WinsorizeConfig::default().validate().is_ok());

        let inverted = WinsorizeConfig {
            lower: 0.9,
            upper: 0.1,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let out_of_range = WinsorizeConfig {
            upper: 1.5,
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }
}
