//! Sector grouping into peer cohorts.
//!
//! Every entity lands in exactly one cohort. Sectors with fewer members than
//! [`CohortConfig::min_size`], and entities with no sector label, are pooled
//! into a single broad-market cohort. Each fallback is logged and returned so
//! consumers can see where discrimination is reduced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;
use vantage_traits::{RawMetricSet, Result, VantageError};

/// Where the broad-market cohort takes its reference distribution from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Compare fallback entities against the whole universe.
    #[default]
    UniverseWide,
    /// Compare fallback entities only against each other.
    MergeSmall,
}

/// Configuration for sector grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Smallest sector that forms its own cohort (default: 5)
    pub min_size: usize,

    /// Reference distribution for the broad-market cohort (default: universe-wide)
    pub fallback: FallbackPolicy,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            min_size: 5,
            fallback: FallbackPolicy::UniverseWide,
        }
    }
}

impl CohortConfig {
    /// Reject a zero minimum size.
    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(VantageError::Configuration(
                "cohort.min_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identity of a cohort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortLabel {
    /// A sector large enough to stand on its own.
    Sector(String),
    /// Pooled small sectors and unlabelled entities.
    BroadMarket,
}

impl fmt::Display for CohortLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sector(name) => f.write_str(name),
            Self::BroadMarket => f.write_str("Broad Market"),
        }
    }
}

/// A peer group for one run.
///
/// `members` are the entities scored against this cohort; `reference` are
/// the entities whose values form its distributions. Both are indices into
/// the slice passed to [`group_by_sector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    /// Cohort identity.
    pub label: CohortLabel,
    /// Entities scored against this cohort.
    pub members: Vec<usize>,
    /// Entities forming the reference distribution.
    pub reference: Vec<usize>,
}

/// A sector (or the unlabelled group) that was folded into broad market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFallback {
    /// Original sector label, `None` for entities without one.
    pub sector: Option<String>,
    /// How many entities the group had.
    pub size: usize,
}

/// Result of grouping a universe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    /// Cohorts in sector order, broad market last.
    pub cohorts: Vec<Cohort>,
    /// Every group that fell back to broad market.
    pub fallbacks: Vec<CohortFallback>,
}

impl Grouping {
    /// The cohort an entity belongs to.
    pub fn cohort_of(&self, index: usize) -> Option<&Cohort> {
        self.cohorts.iter().find(|c| c.members.contains(&index))
    }
}

/// Partition entities into sector cohorts.
pub fn group_by_sector(entities: &[RawMetricSet], config: &CohortConfig) -> Grouping {
    let mut by_sector: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut unlabelled = Vec::new();
    for (i, entity) in entities.iter().enumerate() {
        match entity.sector.as_deref() {
            Some(sector) => by_sector.entry(sector).or_default().push(i),
            None => unlabelled.push(i),
        }
    }

    let mut grouping = Grouping::default();
    let mut broad = Vec::new();

    for (sector, members) in by_sector {
        if members.len() >= config.min_size {
            grouping.cohorts.push(Cohort {
                label: CohortLabel::Sector(sector.to_string()),
                reference: members.clone(),
                members,
            });
        } else {
            warn!(
                sector,
                size = members.len(),
                min_size = config.min_size,
                "Sector below minimum cohort size, falling back to broad market"
            );
            grouping.fallbacks.push(CohortFallback {
                sector: Some(sector.to_string()),
                size: members.len(),
            });
            broad.extend(members);
        }
    }

    if !unlabelled.is_empty() {
        warn!(
            size = unlabelled.len(),
            "Entities without a sector label scored against broad market"
        );
        grouping.fallbacks.push(CohortFallback {
            sector: None,
            size: unlabelled.len(),
        });
        broad.extend(unlabelled);
    }

    if !broad.is_empty() {
        broad.sort_unstable();
        let reference = match config.fallback {
            FallbackPolicy::UniverseWide => (0..entities.len()).collect(),
            FallbackPolicy::MergeSmall => broad.clone(),
        };
        grouping.cohorts.push(Cohort {
            label: CohortLabel::BroadMarket,
            members: broad,
            reference,
        });
    }

    grouping
}
