//! Score persistence.

use crate::{Result, ScoreFile, StoreError};
use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;
use vantage_traits::Date;

/// Environment variable naming the score output directory.
pub const OUTPUT_DIR_ENV: &str = "VANTAGE_OUTPUT_DIR";

/// Destination for a run's scores.
///
/// Writing the same date again must replace the previous output entirely.
pub trait ScoreSink: Send + Sync {
    /// Persist every record of one run.
    fn write(&self, file: &ScoreFile) -> impl Future<Output = Result<()>> + Send;
}

/// Writes one pretty-printed JSON file per as-of date.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// reader never sees a partial run.
#[derive(Debug, Clone)]
pub struct JsonScoreWriter {
    dir: PathBuf,
}

impl JsonScoreWriter {
    /// Create a writer over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a writer from the `VANTAGE_OUTPUT_DIR` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let dir = env::var(OUTPUT_DIR_ENV).map_err(|_| StoreError::MissingEnv(OUTPUT_DIR_ENV))?;
        Ok(Self::new(dir))
    }

    /// Directory the writer targets.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Score file path for a date.
    #[must_use]
    pub fn path_for(&self, as_of: Date) -> PathBuf {
        self.dir.join(format!("scores-{}.json", as_of.format("%Y-%m-%d")))
    }

    /// Serialize a score file to the exact bytes written to disk.
    pub fn encode(file: &ScoreFile) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(file)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Read back the scores persisted for a date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no run has been persisted for `as_of`.
    pub async fn read(&self, as_of: Date) -> Result<ScoreFile> {
        let path = self.path_for(as_of);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("scores for {as_of}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ScoreSink for JsonScoreWriter {
    async fn write(&self, file: &ScoreFile) -> Result<()> {
        let bytes = Self::encode(file)?;
        let path = self.path_for(file.as_of);
        let tmp = self
            .dir
            .join(format!(".scores-{}.json.tmp", file.as_of.format("%Y-%m-%d")));

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!(
            path = %path.display(),
            records = file.records.len(),
            "Persisted scores"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FactorRecord, ScoreRecord};
    use std::collections::BTreeMap;
    use vantage_traits::{FactorKind, Score, UnavailableReason};

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("vantage-writer-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn record(symbol: &str, composite: f64) -> ScoreRecord {
        let mut factors = BTreeMap::new();
        factors.insert(
            FactorKind::Value,
            FactorRecord {
                score: Score::Available { value: composite },
                metrics: Vec::new(),
            },
        );
        factors.insert(
            FactorKind::Sentiment,
            FactorRecord {
                score: Score::unavailable(UnavailableReason::NoComponents),
                metrics: Vec::new(),
            },
        );
        ScoreRecord {
            symbol: symbol.to_string(),
            as_of: date(),
            cohort: "Technology".to_string(),
            factors,
            composite: Score::Available { value: composite },
            composite_weights: [(FactorKind::Value, 1.0)].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let writer = JsonScoreWriter::new(temp_dir("roundtrip"));
        let file = ScoreFile::new(date(), vec![record("MSFT", 40.0), record("AAPL", 70.0)]);

        writer.write(&file).await.unwrap();
        let back = writer.read(date()).await.unwrap();

        assert_eq!(back, file);
        assert_eq!(back.records[0].symbol, "AAPL");
        assert_eq!(
            back.get("MSFT").unwrap().composite,
            Score::Available { value: 40.0 }
        );
    }

    #[tokio::test]
    async fn test_rewrite_overwrites() {
        let writer = JsonScoreWriter::new(temp_dir("overwrite"));
        writer
            .write(&ScoreFile::new(date(), vec![record("AAPL", 70.0), record("MSFT", 1.0)]))
            .await
            .unwrap();
        writer
            .write(&ScoreFile::new(date(), vec![record("AAPL", 71.0)]))
            .await
            .unwrap();

        let back = writer.read(date()).await.unwrap();
        assert_eq!(back.records.len(), 1);
        assert!(!writer.dir().join(".scores-2024-06-28.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_identical_runs_identical_bytes() {
        let writer = JsonScoreWriter::new(temp_dir("bytes"));
        let file = ScoreFile::new(date(), vec![record("AAPL", 70.0)]);

        writer.write(&file).await.unwrap();
        let first = std::fs::read(writer.path_for(date())).unwrap();
        writer.write(&file.clone()).await.unwrap();
        let second = std::fs::read(writer.path_for(date())).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, JsonScoreWriter::encode(&file).unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_is_tagged_in_output() {
        let writer = JsonScoreWriter::new(temp_dir("tagged"));
        writer
            .write(&ScoreFile::new(date(), vec![record("AAPL", 0.0)]))
            .await
            .unwrap();
        let text = std::fs::read_to_string(writer.path_for(date())).unwrap();
        assert!(text.contains(r#""status": "unavailable""#));
        assert!(text.contains(r#""reason": "no_components""#));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let writer = JsonScoreWriter::new(temp_dir("absent"));
        assert!(matches!(
            writer.read(date()).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
