//! The scoring pipeline.
//!
//! A run moves through fixed stages:
//!
//! 1. validate inputs, excluding entities that break the contract
//! 2. split off the benchmark row and derive excess returns
//! 3. group, winsorize and normalize per cohort
//! 4. score the seven factors per entity
//! 5. blend the composite and assemble persisted records
//!
//! Stages 3 to 5 are pure and parallel across cohorts and entities. The
//! only I/O happens in [`ScoringEngine::run`], at the repository and sink.

use crate::config::ScoringConfig;
use crate::diagnostics::{RunDiagnostics, RunSummary, Violation};
use crate::validate::{Validated, validate_inputs};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};
use vantage_combine::Combiner;
use vantage_factors::{BenchmarkReturns, FactorSet, RelativeStrength, derive_excess_returns};
use vantage_normalize::{NormalizedEntity, Normalizer};
use vantage_store::{
    FactorRecord, MetricRecord, MetricRepository, ScoreFile, ScoreRecord, ScoreSink,
};
use vantage_traits::{
    Date, FactorCalculator, FactorKind, MetricSpec, RawMetricSet, Result, Score,
    UnavailableReason, VantageError,
};

/// Records and diagnostics of one scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRun {
    /// As-of date.
    pub as_of: Date,
    /// One record per scored entity, sorted by symbol.
    pub records: Vec<ScoreRecord>,
    /// Fallbacks, strategy decisions and exclusions.
    pub diagnostics: RunDiagnostics,
}

impl ScoringRun {
    /// Look up a record by symbol.
    pub fn get(&self, symbol: &str) -> Option<&ScoreRecord> {
        self.records
            .binary_search_by(|r| r.symbol.as_str().cmp(symbol))
            .ok()
            .map(|i| &self.records[i])
    }

    /// The persisted form of this run.
    #[must_use]
    pub fn to_file(&self) -> ScoreFile {
        ScoreFile::new(self.as_of, self.records.clone())
    }

    /// Headline counts.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(self.as_of, &self.records, &self.diagnostics)
    }
}

/// Scores a universe of entities for one as-of date.
///
/// Built once from a validated [`ScoringConfig`] and reusable across runs.
pub struct ScoringEngine {
    config: ScoringConfig,
    normalizer: Normalizer,
    factors: FactorSet,
    metric_specs: Vec<MetricSpec>,
    combiner: Box<dyn Combiner>,
}

impl fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("normalizer", &self.normalizer)
            .field("factors", &self.factors)
            .field("metrics", &self.metric_specs.len())
            .field("combiner", &self.combiner.name())
            .finish()
    }
}

impl ScoringEngine {
    /// Build an engine.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::Configuration`] if any part of `config` is
    /// invalid. Nothing is computed with a rejected configuration.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::new(config.normalizer.clone())?;
        let factors = FactorSet::from_config(&config.factors)?;
        let metric_specs = factors.metric_specs()?;
        let combiner = config.composite.build();
        debug!(
            metrics = metric_specs.len(),
            combiner = combiner.name(),
            "Built scoring engine"
        );
        Ok(Self {
            config,
            normalizer,
            factors,
            metric_specs,
            combiner,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Every metric the engine normalizes.
    #[must_use]
    pub fn metric_specs(&self) -> &[MetricSpec] {
        &self.metric_specs
    }

    /// Score a universe.
    ///
    /// Never fails as a whole: entities and cohorts that cannot be scored
    /// are excluded and listed in [`RunDiagnostics::violations`].
    pub fn score(&self, as_of: Date, entities: Vec<RawMetricSet>) -> ScoringRun {
        let supplied = entities.len();
        let Validated {
            accepted,
            mut violations,
        } = validate_inputs(entities, as_of);

        let rs = &self.config.factors.relative_strength;
        let (benchmark_rows, mut universe): (Vec<_>, Vec<_>) = accepted
            .into_iter()
            .partition(|e| e.symbol == rs.benchmark);
        let benchmark = BenchmarkReturns::resolve(rs, benchmark_rows.first());
        let benchmark_missing = benchmark.is_empty();
        if benchmark_missing {
            warn!(
                benchmark = %rs.benchmark,
                "No benchmark returns, relative strength unavailable for every entity"
            );
        }
        derive_excess_returns(&mut universe, rs, &benchmark);

        info!(
            as_of = %as_of,
            supplied,
            universe = universe.len(),
            "Scoring universe"
        );
        let normalized = self
            .normalizer
            .normalize_universe(&universe, &self.metric_specs);

        let outcomes: Vec<Result<ScoreRecord>> = normalized
            .entities
            .par_iter()
            .map(|entity| {
                self.build_record(&universe[entity.index], entity, as_of, benchmark_missing)
            })
            .collect();

        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "Excluding entity");
                    violations.push(e);
                }
            }
        }
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        violations.extend(normalized.violations);

        let diagnostics = RunDiagnostics {
            fallbacks: normalized.fallbacks,
            skipped: normalized.skipped,
            decisions: normalized.decisions,
            violations: violations.iter().map(Violation::from).collect(),
            benchmark_missing,
        };

        ScoringRun {
            as_of,
            records,
            diagnostics,
        }
    }

    /// Load, score and persist one as-of date.
    ///
    /// Both boundary calls run under the configured
    /// [`BoundaryPolicy`](vantage_store::BoundaryPolicy). Scores are
    /// written only after the whole universe has been scored.
    ///
    /// # Errors
    ///
    /// Returns the repository or sink error once retries are exhausted.
    pub async fn run<R, S>(
        &self,
        repository: &R,
        sink: &S,
        as_of: Date,
    ) -> vantage_store::Result<ScoringRun>
    where
        R: MetricRepository,
        S: ScoreSink,
    {
        let policy = &self.config.boundary;
        let entities = policy
            .run("load metrics", || repository.load(as_of))
            .await?;
        info!(as_of = %as_of, entities = entities.len(), "Loaded metrics");

        let run = self.score(as_of, entities);
        let file = run.to_file();
        policy.run("persist scores", || sink.write(&file)).await?;

        run.summary().log();
        Ok(run)
    }

    fn build_record(
        &self,
        entity: &RawMetricSet,
        normalized: &NormalizedEntity,
        as_of: Date,
        benchmark_missing: bool,
    ) -> Result<ScoreRecord> {
        let mut factors = BTreeMap::new();
        let mut factor_scores = BTreeMap::new();

        for calculator in self.factors.calculators() {
            let kind = calculator.kind();
            let factor = if kind == FactorKind::RelativeStrength && benchmark_missing {
                RelativeStrength::missing_benchmark()
            } else {
                calculator.score(&normalized.metrics)
            };

            factor_scores.insert(kind, factor.score);
            factors.insert(
                kind,
                FactorRecord {
                    score: factor.score,
                    metrics: drill_down(calculator.as_ref(), entity, normalized, &factor),
                },
            );
        }

        let composite = self
            .combiner
            .combine(&factor_scores)
            .map_err(|e| VantageError::contract(entity.symbol.clone(), e.to_string()))?;

        Ok(ScoreRecord {
            symbol: entity.symbol.clone(),
            as_of,
            cohort: normalized.cohort.to_string(),
            factors,
            composite: composite.score,
            composite_weights: composite.effective_weights,
        })
    }
}

fn drill_down(
    calculator: &dyn FactorCalculator,
    entity: &RawMetricSet,
    normalized: &NormalizedEntity,
    factor: &vantage_traits::FactorScore,
) -> Vec<MetricRecord> {
    let weights: BTreeMap<&str, f64> = factor
        .contributions
        .iter()
        .map(|c| (c.metric.as_str(), c.weight))
        .collect();

    calculator
        .components()
        .iter()
        .map(|component| {
            let name = component.metric.as_str();
            match normalized.metrics.get(name) {
                Some(metric) => MetricRecord {
                    metric: name.to_string(),
                    raw: metric.raw,
                    normalized: metric.score,
                    weight: weights.get(name).copied(),
                    strategy: metric.strategy,
                    inverted: metric.inverted,
                },
                None => MetricRecord {
                    metric: name.to_string(),
                    raw: entity.get(name),
                    normalized: Score::unavailable(UnavailableReason::MissingInput),
                    weight: None,
                    strategy: None,
                    inverted: false,
                },
            }
        })
        .collect()
}
