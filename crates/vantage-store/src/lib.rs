//! Storage boundaries for vantage.
//!
//! This crate holds the two external boundaries of a scoring run:
//! - [`MetricRepository`]: where raw per-entity metrics come from
//! - [`ScoreSink`]: where factor and composite scores are persisted
//!
//! Both are async and wrapped in a [`BoundaryPolicy`] by the caller, so
//! timeouts and retries live only here and never inside the engine.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vantage_store::{CsvMetricRepository, JsonScoreWriter, MetricRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = CsvMetricRepository::from_env()?;
//!     let sets = repo.load(as_of).await?;
//!
//!     let writer = JsonScoreWriter::from_env()?;
//!     let scores = writer.read(as_of).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set in your environment or `.env` file:
//!
//! ```bash
//! VANTAGE_DATA_DIR=./data
//! VANTAGE_OUTPUT_DIR=./scores
//! ```

mod error;
mod policy;
mod record;
mod repository;
mod writer;

pub use error::StoreError;
pub use policy::BoundaryPolicy;
pub use record::{FactorRecord, MetricRecord, ScoreFile, ScoreRecord};
pub use repository::{CsvMetricRepository, DATA_DIR_ENV, InMemoryRepository, MetricRepository};
pub use writer::{JsonScoreWriter, OUTPUT_DIR_ENV, ScoreSink};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
