//! Common types used throughout the vantage engine.
//!
//! This module defines the per-entity raw input record and the DataFrame
//! wrapper used at the repository boundary.

use crate::{Result, VantageError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A security identifier, typically a ticker like "AAPL".
pub type Symbol = String;

/// Column holding the entity symbol.
pub const SYMBOL_COLUMN: &str = "symbol";

/// Column holding the sector label.
pub const SECTOR_COLUMN: &str = "sector";

/// Column holding the as-of date.
pub const DATE_COLUMN: &str = "date";

/// Raw metrics for one entity on one as-of date.
///
/// Absence is explicit: a metric that is missing from `metrics` and a
/// metric present with `None` both mean "no value", and neither is ever
/// treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetricSet {
    /// Entity identifier.
    pub symbol: Symbol,
    /// Sector label, if known.
    pub sector: Option<String>,
    /// Date the metrics describe.
    pub as_of: Date,
    /// Metric name to value, `None` when explicitly absent.
    pub metrics: BTreeMap<String, Option<f64>>,
}

impl RawMetricSet {
    /// Create an empty metric set.
    pub fn new(symbol: impl Into<Symbol>, as_of: Date) -> Self {
        Self {
            symbol: symbol.into(),
            sector: None,
            as_of,
            metrics: BTreeMap::new(),
        }
    }

    /// Set the sector label.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Add a metric value.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), Some(value));
        self
    }

    /// Record a metric as explicitly absent.
    #[must_use]
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.metrics.insert(name.into(), None);
        self
    }

    /// Insert or replace a metric value.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.metrics.insert(name.into(), value);
    }

    /// The value of a metric, `None` if absent.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().flatten()
    }
}

/// Tabular metric input, one row per entity.
///
/// `MetricFrame` wraps a Polars DataFrame so repositories can load CSV or
/// other columnar sources before the rows are split into [`RawMetricSet`]s.
///
/// # Expected Schema
///
/// - `symbol`: entity identifier (required)
/// - `sector`: sector label (optional, nullable)
/// - `date`: as-of date (optional)
/// - every other column: a numeric metric, nulls meaning absent
///
/// # Example
///
/// ```no_run
/// use vantage_traits::{Date, MetricFrame};
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["AAPL", "MSFT"],
///     "sector" => &["Technology", "Technology"],
///     "pe_ratio" => &[28.0, 31.0],
/// }.unwrap();
///
/// let as_of = Date::from_ymd_opt(2024, 6, 28).unwrap();
/// let sets = MetricFrame::new(df).to_raw_sets(as_of).unwrap();
/// assert_eq!(sets.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MetricFrame {
    data: DataFrame,
}

impl MetricFrame {
    /// Creates a new `MetricFrame` from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Names of the metric columns, i.e. everything except symbol, sector and date.
    pub fn metric_columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| ![SYMBOL_COLUMN, SECTOR_COLUMN, DATE_COLUMN].contains(&name.as_str()))
            .collect()
    }

    /// Split the frame into one [`RawMetricSet`] per row.
    ///
    /// Rows without a `date` column value are dated `as_of`. Row order is
    /// preserved; duplicates are left for input validation to reject. A
    /// metric cell that is present but not numeric is an error, never a
    /// missing value.
    pub fn to_raw_sets(&self, as_of: Date) -> Result<Vec<RawMetricSet>> {
        if !self.has_column(SYMBOL_COLUMN) {
            return Err(VantageError::MissingColumn(SYMBOL_COLUMN.to_string()));
        }

        let height = self.data.height();
        let symbols = self.string_column(SYMBOL_COLUMN)?;
        let sectors = if self.has_column(SECTOR_COLUMN) {
            self.string_column(SECTOR_COLUMN)?
        } else {
            vec![None; height]
        };
        let dates = if self.has_column(DATE_COLUMN) {
            self.string_column(DATE_COLUMN)?
                .into_iter()
                .map(|raw| raw.map(|s| parse_date(&s)).transpose())
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![None; height]
        };

        let mut metric_values = Vec::new();
        for name in self.metric_columns() {
            let raw = self.data.column(&name)?.as_materialized_series();
            let series = raw.cast(&DataType::Float64)?;
            let malformed = series.null_count() - raw.null_count();
            if malformed > 0 {
                return Err(VantageError::InvalidData(format!(
                    "column '{name}' has {malformed} non-numeric value(s)"
                )));
            }
            let values: Vec<Option<f64>> = series.f64()?.into_iter().collect();
            metric_values.push((name, values));
        }

        let mut sets = Vec::with_capacity(height);
        for row in 0..height {
            let mut set = RawMetricSet::new(
                symbols[row].clone().unwrap_or_default(),
                dates[row].unwrap_or(as_of),
            );
            set.sector = sectors[row].clone().filter(|s| !s.trim().is_empty());
            for (name, values) in &metric_values {
                set.insert(name.clone(), values[row]);
            }
            sets.push(set);
        }
        Ok(sets)
    }

    fn string_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self
            .data
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        Ok(series
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }
}

impl From<DataFrame> for MetricFrame {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MetricFrame {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<Date> {
    Date::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| VantageError::InvalidDate(format!("'{s}': {e}")))
}
