//! Input contract checks.
//!
//! Every entity is checked before grouping. An entity that breaks the
//! contract is excluded from the run with a
//! [`VantageError::ContractViolation`]; the rest of the universe is scored
//! as if it had never been supplied.

use std::collections::BTreeMap;
use tracing::warn;
use vantage_factors::get_metric_info;
use vantage_traits::{Date, RawMetricSet, VantageError};

/// Entities accepted for scoring and the violations of those that were not.
#[derive(Debug, Default)]
pub struct Validated {
    /// Entities that passed every check, in input order.
    pub accepted: Vec<RawMetricSet>,
    /// One violation per excluded entity.
    pub violations: Vec<VantageError>,
}

/// Check each entity against the input contract for `as_of`.
///
/// An entity is excluded when its symbol is empty, its as-of date differs
/// from the run's, or any present metric is NaN, infinite, or outside the
/// range its registry entry declares. A symbol that appears more than once
/// is ambiguous, so every copy is excluded.
pub fn validate_inputs(entities: Vec<RawMetricSet>, as_of: Date) -> Validated {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in &entities {
        *counts.entry(entity.symbol.clone()).or_default() += 1;
    }

    let mut validated = Validated::default();
    for entity in entities {
        match check(&entity, as_of, counts[&entity.symbol]) {
            None => validated.accepted.push(entity),
            Some(detail) => {
                let error = VantageError::contract(entity.symbol, detail);
                warn!(error = %error, "Excluding entity");
                validated.violations.push(error);
            }
        }
    }
    validated
}

fn check(entity: &RawMetricSet, as_of: Date, occurrences: usize) -> Option<String> {
    if entity.symbol.trim().is_empty() {
        return Some("symbol is empty".to_string());
    }
    if occurrences > 1 {
        return Some(format!("symbol appears {occurrences} times in the universe"));
    }
    if entity.as_of != as_of {
        return Some(format!(
            "as-of date {} does not match run date {as_of}",
            entity.as_of
        ));
    }
    entity.metrics.iter().find_map(|(name, value)| {
        let value = (*value)?;
        if !value.is_finite() {
            return Some(format!("metric '{name}' is not finite: {value:?}"));
        }
        let (min, max) = get_metric_info(name)
            .filter(|info| !info.accepts(value))?
            .valid_range?;
        Some(format!("metric '{name}' value {value} is outside [{min}, {max}]"))
    })
}
