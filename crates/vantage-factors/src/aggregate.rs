//! Weighted aggregation of component metrics into a factor score.

use std::collections::BTreeMap;
use vantage_traits::{
    Contribution, FactorComponent, FactorKind, FactorScore, NormalizedMetrics, Result, Score,
    UnavailableReason, VantageError,
};

/// Weighted mean over the components that are available for this entity.
///
/// Weights are renormalized over available components only, so a missing
/// metric neither drags the score down nor props it up. With no available
/// component the factor is [`UnavailableReason::NoComponents`].
pub fn weighted_mean(
    factor: FactorKind,
    components: &[FactorComponent],
    metrics: &NormalizedMetrics,
) -> FactorScore {
    let available: Vec<(&FactorComponent, f64)> = components
        .iter()
        .filter(|c| c.weight > 0.0)
        .filter_map(|c| {
            metrics
                .get(&c.metric)
                .and_then(|m| m.score.value())
                .map(|v| (c, v))
        })
        .collect();

    let total: f64 = available.iter().map(|(c, _)| c.weight).sum();
    if available.is_empty() || total <= 0.0 {
        return FactorScore {
            factor,
            score: Score::unavailable(UnavailableReason::NoComponents),
            contributions: Vec::new(),
        };
    }

    let contributions: Vec<Contribution> = available
        .iter()
        .map(|(c, value)| Contribution {
            metric: c.metric.clone(),
            value: *value,
            weight: c.weight / total,
        })
        .collect();
    let value = contributions.iter().map(|c| c.weight * c.value).sum();

    FactorScore {
        factor,
        score: Score::clamped(value),
        contributions,
    }
}

/// Apply weight overrides to a factor's default components.
///
/// Overrides may only name existing components, must be finite and
/// non-negative, and must leave a positive total weight.
pub fn apply_overrides(
    factor: FactorKind,
    mut components: Vec<FactorComponent>,
    overrides: Option<&BTreeMap<String, f64>>,
) -> Result<Vec<FactorComponent>> {
    if let Some(overrides) = overrides {
        for (metric, weight) in overrides {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(VantageError::Configuration(format!(
                    "weight for {factor}.{metric} must be a non-negative number, got {weight}"
                )));
            }
            let component = components
                .iter_mut()
                .find(|c| &c.metric == metric)
                .ok_or_else(|| {
                    VantageError::Configuration(format!(
                        "'{metric}' is not a component of the {factor} factor"
                    ))
                })?;
            component.weight = *weight;
        }
    }

    let total: f64 = components.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return Err(VantageError::Configuration(format!(
            "component weights of the {factor} factor must sum to a positive value"
        )));
    }
    Ok(components)
}

/// Equal-weight components for the given metric names.
pub fn equal_components<'a>(metrics: impl IntoIterator<Item = &'a str>) -> Vec<FactorComponent> {
    metrics
        .into_iter()
        .map(|m| FactorComponent::new(m, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vantage_traits::NormalizedScore;

    fn available(metric: &str, value: f64) -> (String, NormalizedScore) {
        (
            metric.to_string(),
            NormalizedScore::new(metric, None, Score::Available { value }),
        )
    }

    fn missing(metric: &str) -> (String, NormalizedScore) {
        (
            metric.to_string(),
            NormalizedScore::new(
                metric,
                None,
                Score::unavailable(UnavailableReason::MissingInput),
            ),
        )
    }

    #[test]
    fn test_weighted_mean_renormalizes_over_available() {
        let components = equal_components(["a", "b", "c"]);
        let metrics: NormalizedMetrics =
            [available("a", 80.0), available("b", 40.0), missing("c")]
                .into_iter()
                .collect();

        let score = weighted_mean(FactorKind::Quality, &components, &metrics);
        assert_relative_eq!(score.score.value().unwrap(), 60.0);
        assert_eq!(score.contributions.len(), 2);
        let weight_sum: f64 = score.contributions.iter().map(|c| c.weight).sum();
        assert_relative_eq!(weight_sum, 1.0);
    }

    #[test]
    fn test_custom_weights() {
        let components = vec![FactorComponent::new("a", 3.0), FactorComponent::new("b", 1.0)];
        let metrics: NormalizedMetrics = [available("a", 100.0), available("b", 0.0)]
            .into_iter()
            .collect();

        let score = weighted_mean(FactorKind::Value, &components, &metrics);
        assert_relative_eq!(score.score.value().unwrap(), 75.0);
    }

    #[test]
    fn test_no_components_available() {
        let components = equal_components(["a", "b"]);
        let metrics: NormalizedMetrics = [missing("a")].into_iter().collect();

        let score = weighted_mean(FactorKind::Growth, &components, &metrics);
        assert_eq!(score.score.reason(), Some(UnavailableReason::NoComponents));
        assert!(score.contributions.is_empty());
    }

    #[test]
    fn test_zero_weight_component_ignored() {
        let components = vec![FactorComponent::new("a", 0.0), FactorComponent::new("b", 1.0)];
        let metrics: NormalizedMetrics = [available("a", 90.0), missing("b")]
            .into_iter()
            .collect();

        let score = weighted_mean(FactorKind::Momentum, &components, &metrics);
        assert!(!score.score.is_available());
    }

    #[test]
    fn test_apply_overrides() {
        let overrides: BTreeMap<String, f64> = [("b".to_string(), 2.0)].into_iter().collect();
        let components =
            apply_overrides(FactorKind::Value, equal_components(["a", "b"]), Some(&overrides))
                .unwrap();
        assert_relative_eq!(components[1].weight, 2.0);
    }

    #[test]
    fn test_apply_overrides_rejects_invalid() {
        let negative: BTreeMap<String, f64> = [("a".to_string(), -1.0)].into_iter().collect();
        assert!(
            apply_overrides(FactorKind::Value, equal_components(["a"]), Some(&negative)).is_err()
        );

        let unknown: BTreeMap<String, f64> = [("zzz".to_string(), 1.0)].into_iter().collect();
        assert!(
            apply_overrides(FactorKind::Value, equal_components(["a"]), Some(&unknown)).is_err()
        );

        let zero: BTreeMap<String, f64> = [("a".to_string(), 0.0)].into_iter().collect();
        let err =
            apply_overrides(FactorKind::Value, equal_components(["a"]), Some(&zero)).unwrap_err();
        assert!(matches!(err, VantageError::Configuration(_)));
    }
}
