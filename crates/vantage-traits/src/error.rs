//! Error types for the vantage engine.
//!
//! Missing data is deliberately absent from this enum: an entity, metric or
//! factor that cannot be computed is represented by
//! [`Score::Unavailable`](crate::Score::Unavailable), never by an error.

use thiserror::Error;

/// The main error type for vantage operations.
#[derive(Debug, Error)]
pub enum VantageError {
    /// Malformed input for a single entity or cohort.
    ///
    /// Fatal only for the entity or cohort named in `entity`; the run continues.
    #[error("Contract violation for '{entity}': {detail}")]
    ContractViolation {
        /// Symbol or cohort label the violation applies to.
        entity: String,
        /// Human-readable description of what was wrong.
        detail: String,
    },

    /// Invalid configuration, fatal before any computation starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl VantageError {
    /// Build a [`VantageError::ContractViolation`].
    pub fn contract(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ContractViolation {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error aborts the whole run rather than one entity.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::ContractViolation { .. })
    }
}

impl From<String> for VantageError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for VantageError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for vantage operations.
pub type Result<T> = std::result::Result<T, VantageError>;
