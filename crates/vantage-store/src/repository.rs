//! Metric repositories: where raw per-entity inputs come from.

use crate::{Result, StoreError};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vantage_traits::{Date, MetricFrame, RawMetricSet};

/// Environment variable naming the metric data directory.
pub const DATA_DIR_ENV: &str = "VANTAGE_DATA_DIR";

/// File holding every date, filtered on its `date` column.
const COMBINED_FILE: &str = "metrics.csv";

/// Source of raw metrics for one as-of date.
pub trait MetricRepository: Send + Sync {
    /// Load every entity's raw metrics for `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the date has no data.
    fn load(&self, as_of: Date) -> impl Future<Output = Result<Vec<RawMetricSet>>> + Send;
}

/// Reads metrics from CSV files in a directory.
///
/// Looks for `metrics-YYYY-MM-DD.csv` first and falls back to a single
/// `metrics.csv` with a `date` column. Each file needs a `symbol` column,
/// may have a `sector` column, and every other column is a metric.
#[derive(Debug, Clone)]
pub struct CsvMetricRepository {
    dir: PathBuf,
}

impl CsvMetricRepository {
    /// Create a repository over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a repository from the `VANTAGE_DATA_DIR` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let dir = env::var(DATA_DIR_ENV).map_err(|_| StoreError::MissingEnv(DATA_DIR_ENV))?;
        Ok(Self::new(dir))
    }

    /// Directory the repository reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-date file path.
    #[must_use]
    pub fn path_for(&self, as_of: Date) -> PathBuf {
        self.dir.join(format!("metrics-{}.csv", as_of.format("%Y-%m-%d")))
    }
}

impl MetricRepository for CsvMetricRepository {
    async fn load(&self, as_of: Date) -> Result<Vec<RawMetricSet>> {
        let dated = self.path_for(as_of);
        let combined = self.dir.join(COMBINED_FILE);

        let sets = if tokio::fs::try_exists(&dated).await? {
            debug!(path = %dated.display(), "Loading per-date metrics file");
            tokio::task::spawn_blocking(move || read_csv(&dated, as_of)).await??
        } else if tokio::fs::try_exists(&combined).await? {
            debug!(path = %combined.display(), "Loading combined metrics file");
            let all = tokio::task::spawn_blocking(move || read_csv(&combined, as_of)).await??;
            all.into_iter().filter(|s| s.as_of == as_of).collect()
        } else {
            return Err(StoreError::NotFound(format!(
                "{as_of} in {}",
                self.dir.display()
            )));
        };

        info!(entities = sets.len(), %as_of, "Loaded metrics");
        Ok(sets)
    }
}

fn read_csv(path: &Path, as_of: Date) -> Result<Vec<RawMetricSet>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(MetricFrame::new(df).to_raw_sets(as_of)?)
}

/// Holds metric sets in memory, keyed by date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    data: BTreeMap<Date, Vec<RawMetricSet>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the metric sets for a date, replacing any already present.
    pub fn insert(&mut self, as_of: Date, sets: Vec<RawMetricSet>) {
        self.data.insert(as_of, sets);
    }
}

impl MetricRepository for InMemoryRepository {
    async fn load(&self, as_of: Date) -> Result<Vec<RawMetricSet>> {
        self.data
            .get(&as_of)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(as_of.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("vantage-repo-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_csv_per_date_file() {
        let dir = temp_dir("dated");
        std::fs::write(
            dir.join("metrics-2024-06-28.csv"),
            "symbol,sector,pe_ratio,return_1m\nAAPL,Technology,28.5,0.02\nXOM,Energy,,-0.01\n",
        )
        .unwrap();

        let repo = CsvMetricRepository::new(&dir);
        let sets = repo.load(date()).await.unwrap();

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].symbol, "AAPL");
        assert_eq!(sets[0].sector.as_deref(), Some("Technology"));
        assert_eq!(sets[0].get("pe_ratio"), Some(28.5));
        assert_eq!(sets[1].get("pe_ratio"), None);
        assert_eq!(sets[1].get("return_1m"), Some(-0.01));
    }

    #[tokio::test]
    async fn test_csv_combined_file_filters_date() {
        let dir = temp_dir("combined");
        std::fs::write(
            dir.join("metrics.csv"),
            "symbol,date,sector,pe_ratio\nAAPL,2024-06-27,Technology,28.0\nAAPL,2024-06-28,Technology,29.0\n",
        )
        .unwrap();

        let sets = CsvMetricRepository::new(&dir).load(date()).await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].get("pe_ratio"), Some(29.0));
    }

    #[tokio::test]
    async fn test_csv_missing_date() {
        let dir = temp_dir("missing");
        let err = CsvMetricRepository::new(&dir).load(date()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_in_memory() {
        let mut repo = InMemoryRepository::new();
        repo.insert(date(), vec![RawMetricSet::new("AAPL", date())]);

        assert_eq!(repo.load(date()).await.unwrap().len(), 1);
        assert!(repo.load(date().succ_opt().unwrap()).await.is_err());
    }

    #[test]
    fn test_path_for() {
        let repo = CsvMetricRepository::new("/data");
        assert_eq!(
            repo.path_for(date()),
            PathBuf::from("/data/metrics-2024-06-28.csv")
        );
    }
}
