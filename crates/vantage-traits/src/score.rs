//! Bounded scores and the explicit "unavailable" state.
//!
//! Every normalized metric, factor and composite value in vantage is a
//! [`Score`]. A score is either a finite value in `[0, 100]` or an
//! [`Score::Unavailable`] carrying the reason it could not be computed.
//! There is no numeric placeholder for missing data anywhere in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the display scale.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the display scale.
pub const SCORE_MAX: f64 = 100.0;

/// Centre of the display scale (a z-score of zero).
pub const SCORE_MIDPOINT: f64 = 50.0;

/// Why a score could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The entity has no value for the input metric.
    MissingInput,
    /// The cohort had fewer non-missing values than the observation floor.
    InsufficientObservations,
    /// The cohort distribution has zero or undefined dispersion.
    DegenerateDistribution,
    /// None of the factor's component metrics were available.
    NoComponents,
    /// None of the seven factors were available.
    NoFactors,
    /// The benchmark return needed for an excess-return metric is absent.
    MissingBenchmark,
}

impl UnavailableReason {
    /// Short description for logs and terminal output.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::MissingInput => "no input value",
            Self::InsufficientObservations => "too few cohort observations",
            Self::DegenerateDistribution => "cohort distribution has no dispersion",
            Self::NoComponents => "no component metrics available",
            Self::NoFactors => "no factor scores available",
            Self::MissingBenchmark => "benchmark return missing",
        }
    }
}

/// A bounded score or an explicit unavailable marker.
///
/// Serializes as `{"status": "available", "value": 61.2}` or
/// `{"status": "unavailable", "reason": "no_components"}` so downstream
/// consumers can always tell "low" from "unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Score {
    /// A finite value in `[0, 100]`.
    Available {
        /// The score value.
        value: f64,
    },
    /// The score could not be computed.
    Unavailable {
        /// Why the score is missing.
        reason: UnavailableReason,
    },
}

impl Score {
    /// Build an unavailable score.
    #[must_use]
    pub const fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    /// Clamp `value` onto `[0, 100]`.
    ///
    /// A non-finite input yields [`UnavailableReason::DegenerateDistribution`]
    /// rather than a number.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self::Available {
                value: value.clamp(SCORE_MIN, SCORE_MAX),
            }
        } else {
            Self::unavailable(UnavailableReason::DegenerateDistribution)
        }
    }

    /// Accept `value` only when it already lies on the display scale.
    #[must_use]
    pub fn checked(value: f64) -> Option<Self> {
        in_range(value).then_some(Self::Available { value })
    }

    /// The numeric value, if available.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Available { value } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    /// The unavailable reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::Available { .. } => None,
            Self::Unavailable { reason } => Some(*reason),
        }
    }

    /// Whether a value is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available { value } => write!(f, "{value:.2}"),
            Self::Unavailable { reason } => write!(f, "n/a ({})", reason.description()),
        }
    }
}

/// Whether `value` is finite and inside `[0, 100]`.
#[must_use]
pub fn in_range(value: f64) -> bool {
    value.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&value)
}
