//! Statistical helpers shared by normalization and strategy selection.

use ndarray::Array1;

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Mean and sample standard deviation of a set of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (N-1 denominator), zero for a single value.
    pub std: f64,
}

impl Summary {
    /// Whether the dispersion is large enough to standardize against.
    #[must_use]
    pub fn has_dispersion(&self) -> bool {
        self.count >= 2 && self.std.is_finite() && self.std > MIN_STD_THRESHOLD
    }

    /// Coefficient of variation `std / |mean|`, `None` when the mean is ~0.
    #[must_use]
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        coefficient_of_variation(self.mean, self.std)
    }
}

/// Summarize finite values with ndarray (ddof=1, as the rest of the stack).
///
/// Returns `None` for empty input. Non-finite values must be filtered by the
/// caller.
///
/// # Examples
///
/// ```
/// use vantage_traits::stats::summarize;
///
/// let summary = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert!((summary.mean - 3.0).abs() < 1e-10);
/// assert!(summary.has_dispersion());
/// ```
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let array = Array1::from_iter(values.iter().copied());
    let mean = array.mean()?;
    let std = if values.len() > 1 { array.std(1.0) } else { 0.0 };
    Some(Summary {
        count: values.len(),
        mean,
        std,
    })
}

/// Coefficient of variation `std / |mean|`.
pub fn coefficient_of_variation(mean: f64, std: f64) -> Option<f64> {
    if !mean.is_finite() || !std.is_finite() || mean.abs() < MIN_STD_THRESHOLD {
        None
    } else {
        Some(std / mean.abs())
    }
}

/// Linear-interpolated quantile of an ascending slice, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Quartile coefficient of dispersion `(Q3 - Q1) / (Q3 + Q1)`.
///
/// Robust to the handful of extreme outputs a clamped scale produces, which
/// makes it a better "is everything piled up near the middle" test for
/// 0-100 scores than the plain coefficient of variation.
pub fn quartile_dispersion(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile_sorted(&sorted, 0.25)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let denom = q3 + q1;
    if denom.abs() < MIN_STD_THRESHOLD {
        None
    } else {
        Some((q3 - q1) / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summarize_basic() {
        let summary = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_relative_eq!(summary.mean, 3.0);
        assert_relative_eq!(summary.std, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert!(summary.has_dispersion());
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_single_value() {
        let summary = summarize(&[42.0]).unwrap();
        assert_relative_eq!(summary.std, 0.0);
        assert!(!summary.has_dispersion());
    }

    #[test]
    fn test_min_std_threshold() {
        let summary = summarize(&[1.0, 1.0 + 1e-12, 1.0 - 1e-12, 1.0 + 2e-12]).unwrap();
        assert!(!summary.has_dispersion());
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_relative_eq!(coefficient_of_variation(10.0, 2.0).unwrap(), 0.2);
        assert_relative_eq!(coefficient_of_variation(-10.0, 2.0).unwrap(), 0.2);
        assert!(coefficient_of_variation(0.0, 2.0).is_none());
    }

    #[test]
    fn test_quantile_sorted() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_sorted(&sorted, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.5).unwrap(), 3.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.25).unwrap(), 2.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.9).unwrap(), 4.6);
        assert!(quantile_sorted(&[], 0.5).is_none());
    }

    #[test]
    fn test_quartile_dispersion() {
        let spread = quartile_dispersion(&[0.0, 25.0, 50.0, 75.0, 100.0]).unwrap();
        assert_relative_eq!(spread, 0.5);

        let clustered = quartile_dispersion(&[48.0, 49.0, 50.0, 51.0, 52.0]).unwrap();
        assert!(clustered < 0.05);
    }
}
