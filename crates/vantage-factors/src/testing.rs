//! Fixtures shared by the calculator tests.

use vantage_traits::{NormalizedMetrics, NormalizedScore, Score, UnavailableReason};

/// Build normalized metrics from `(name, display value)` pairs.
pub(crate) fn metrics(values: &[(&str, Option<f64>)]) -> NormalizedMetrics {
    values
        .iter()
        .map(|(name, value)| {
            let score = value.map_or(
                Score::unavailable(UnavailableReason::MissingInput),
                |v| Score::Available { value: v },
            );
            (
                (*name).to_string(),
                NormalizedScore::new(*name, None, score),
            )
        })
        .collect()
}
