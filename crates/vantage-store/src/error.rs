//! Error types for the storage boundaries.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur at the repository and persistence boundaries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Failed to encode or parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV loading failed.
    #[error("Failed to read CSV: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Converting loaded data failed.
    #[error(transparent)]
    Vantage(#[from] vantage_traits::VantageError),

    /// An operation exceeded its time budget.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// What was being attempted.
        operation: String,
        /// The budget that was exceeded.
        after: Duration,
    },

    /// No data exists for the requested date.
    #[error("No data available for {0}")]
    NotFound(String),

    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),

    /// Required environment variable is not set.
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
}

impl StoreError {
    /// Whether retrying the operation could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout { .. } | Self::Task(_))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
