//! End-to-end properties of a scoring run.

use crate::{ScoringConfig, ScoringEngine};
use approx::assert_relative_eq;
use vantage_normalize::winsorize::winsorize;
use vantage_normalize::{
    CohortLabel, Normalizer, NormalizerConfig, StrategySelector, WinsorizeConfig,
};
use vantage_store::{JsonScoreWriter, ScoreRecord, ScoreSink};
use vantage_traits::{
    Date, Direction, FactorKind, MetricSpec, RawMetricSet, Score, UnavailableReason,
};

fn date() -> Date {
    Date::from_ymd_opt(2024, 6, 28).unwrap()
}

/// One metric per factor with a deterministic, non-degenerate spread.
fn company(symbol: &str, sector: &str, i: u32) -> RawMetricSet {
    let a = f64::from((i * 7) % 11);
    let b = f64::from((i * 5) % 13);
    RawMetricSet::new(symbol, date())
        .with_sector(sector)
        .with_metric("return_on_equity", 0.05 + 0.013 * a)
        .with_metric("pe_ratio", 12.0 + 2.5 * b)
        .with_metric("revenue_growth_yoy", -0.02 + 0.011 * b)
        .with_metric("return_6m", -0.10 + 0.03 * a)
        .with_metric("short_interest_pct", 0.01 + 0.004 * b)
        .with_metric("analyst_consensus", 2.0 + 0.25 * a)
}

fn benchmark() -> RawMetricSet {
    RawMetricSet::new("SPY", date()).with_metric("return_6m", 0.03)
}

fn universe() -> Vec<RawMetricSet> {
    let mut entities = Vec::new();
    for i in 0..20 {
        entities.push(company(&format!("TECH{i:02}"), "Technology", i));
    }
    for i in 0..12 {
        entities.push(company(&format!("HLTH{i:02}"), "Health Care", i + 3));
    }
    for i in 0..3 {
        entities.push(company(&format!("ENGY{i:02}"), "Energy", i + 5));
    }
    let mut orphan = company("ORPHAN", "", 9);
    orphan.sector = None;
    entities.push(orphan);
    entities.push(benchmark());
    entities
}

fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default()).unwrap()
}

fn assert_on_scale(score: &Score) {
    if let Some(value) = score.value() {
        assert!(value.is_finite());
        assert!((0.0..=100.0).contains(&value), "{value}");
    }
}

fn metric_score(record: &ScoreRecord, factor: FactorKind, metric: &str) -> Score {
    record.factors[&factor]
        .metrics
        .iter()
        .find(|m| m.metric == metric)
        .unwrap()
        .normalized
}

#[test]
fn test_every_score_on_scale_or_unavailable() {
    let mut entities = universe();
    entities.push(
        company("OUTLIER", "Technology", 4)
            .with_metric("pe_ratio", 8249.0)
            .with_metric("return_6m", 45.0),
    );
    let run = engine().score(date(), entities);

    assert!(!run.records.is_empty());
    for record in &run.records {
        assert_eq!(record.factors.len(), 7);
        for factor in record.factors.values() {
            assert_on_scale(&factor.score);
            for metric in &factor.metrics {
                assert_on_scale(&metric.normalized);
            }
        }
        assert_on_scale(&record.composite);
    }
}

#[test]
fn test_composite_unavailable_iff_all_factors_unavailable() {
    let mut entities = universe();
    entities.push(RawMetricSet::new("EMPTY", date()).with_sector("Technology"));
    entities.push(
        RawMetricSet::new("THIN", date())
            .with_sector("Technology")
            .with_metric("analyst_consensus", 3.1),
    );
    let run = engine().score(date(), entities);

    for record in &run.records {
        let any_factor = record.factors.values().any(|f| f.score.is_available());
        assert_eq!(record.composite.is_available(), any_factor, "{}", record.symbol);
    }

    let empty = run.get("EMPTY").unwrap();
    assert_eq!(empty.composite.reason(), Some(UnavailableReason::NoFactors));
    assert!(empty.composite_weights.is_empty());

    let thin = run.get("THIN").unwrap();
    assert!(thin.composite.is_available());
    assert_relative_eq!(
        thin.composite.value().unwrap(),
        thin.factors[&FactorKind::Sentiment].score.value().unwrap(),
        epsilon = 1e-9
    );
}

#[test]
fn test_winsorization_idempotent() {
    let config = WinsorizeConfig::default();
    let distributions = [
        vec![8249.0, 22.0, 19.0, 25.0, 21.0],
        (0..250).map(|i| f64::from(i * i) / 7.0).collect::<Vec<_>>(),
        vec![1.0, 1.0, 1.0, 2.0, 1000.0, -1000.0, 3.0],
    ];
    for distribution in distributions {
        let mut once = distribution.clone();
        winsorize(&mut once, &config);
        let mut twice = once.clone();
        winsorize(&mut twice, &config);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_percentile_rank_uses_full_range() {
    let mut config = ScoringConfig::default();
    config
        .normalizer
        .normalization
        .per_metric
        .insert("return_on_equity".to_string(), StrategySelector::PercentileRank);
    let engine = ScoringEngine::new(config).unwrap();

    // Tightly clustered values plus one far outlier.
    let mut entities: Vec<_> = (0..29)
        .map(|i| {
            company(&format!("BANK{i:02}"), "Financials", i)
                .with_metric("return_on_equity", 0.15 + 1e-6 * f64::from(i))
        })
        .collect();
    entities.push(company("BANK29", "Financials", 29).with_metric("return_on_equity", 5.0));
    let run = engine.score(date(), entities);

    let scores: Vec<f64> = run
        .records
        .iter()
        .map(|r| {
            metric_score(r, FactorKind::Quality, "return_on_equity")
                .value()
                .unwrap()
        })
        .collect();
    let max = scores.iter().copied().fold(f64::MIN, f64::max);
    let min = scores.iter().copied().fold(f64::MAX, f64::min);
    assert_eq!(scores.len(), 30);
    assert!(max - min >= 90.0, "range {}", max - min);
}

#[test]
fn test_inversion_reverses_ranking() {
    let values = [3.0, 9.5, 1.2, 7.7, 4.4, 12.0, 6.1, 0.4];
    let entities: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            RawMetricSet::new(format!("E{i}"), date())
                .with_sector("Industrials")
                .with_metric("plain", v)
                .with_metric("inverted", v)
        })
        .collect();
    let specs = [
        MetricSpec::new("plain", Direction::HigherIsBetter),
        MetricSpec::new("inverted", Direction::LowerIsBetter),
    ];

    for selector in [StrategySelector::ZScore, StrategySelector::PercentileRank] {
        let mut config = NormalizerConfig::default();
        config.normalization.default_strategy = selector;
        let result = Normalizer::new(config)
            .unwrap()
            .normalize_universe(&entities, &specs);

        let scores = |metric: &str| -> Vec<f64> {
            result
                .entities
                .iter()
                .map(|e| e.metrics[metric].score.value().unwrap())
                .collect()
        };
        let plain = scores("plain");
        let inverted = scores("inverted");

        for i in 0..plain.len() {
            for j in 0..plain.len() {
                if plain[i] > plain[j] {
                    assert!(inverted[i] < inverted[j], "{selector:?} {i} {j}");
                }
            }
        }

        let top = |s: &[f64]| s.iter().copied().fold(f64::MIN, f64::max);
        let bottom = |s: &[f64]| s.iter().copied().fold(f64::MAX, f64::min);
        let best_plain: Vec<_> = (0..plain.len()).filter(|&i| plain[i] == top(&plain)).collect();
        let worst_inverted: Vec<_> = (0..inverted.len())
            .filter(|&i| inverted[i] == bottom(&inverted))
            .collect();
        assert_eq!(best_plain, worst_inverted, "{selector:?}");
        assert!(best_plain.contains(&5));
    }
}

#[test]
fn test_one_missing_factor_weights_sum_to_one() {
    let mut entities = universe();
    let mut no_sentiment = company("NOSENT", "Technology", 2);
    no_sentiment.insert("analyst_consensus", None);
    entities.push(no_sentiment);
    let run = engine().score(date(), entities);

    let record = run.get("NOSENT").unwrap();
    let unavailable: Vec<_> = record
        .factors
        .iter()
        .filter(|(_, f)| !f.score.is_available())
        .map(|(k, _)| *k)
        .collect();
    assert_eq!(unavailable, vec![FactorKind::Sentiment]);

    assert_eq!(record.composite_weights.len(), 6);
    assert!(!record.composite_weights.contains_key(&FactorKind::Sentiment));
    assert_relative_eq!(
        record.composite_weights.values().sum::<f64>(),
        1.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        record.composite_weights[&FactorKind::Momentum],
        0.20 / 0.95,
        epsilon = 1e-9
    );
}

#[test]
fn test_pe_outlier_clamped_and_outscored() {
    let pes = [8249.0, 22.0, 19.0, 25.0, 21.0];
    let entities: Vec<_> = pes
        .iter()
        .enumerate()
        .map(|(i, &pe)| {
            RawMetricSet::new(format!("T{i}"), date())
                .with_sector("Technology")
                .with_metric("pe_ratio", pe)
        })
        .collect();

    let specs = [MetricSpec::new("pe_ratio", Direction::LowerIsBetter)];
    let normalized = Normalizer::new(NormalizerConfig::default())
        .unwrap()
        .normalize_universe(&entities, &specs);
    assert_eq!(
        normalized.entities[0].cohort,
        CohortLabel::Sector("Technology".to_string())
    );
    assert_eq!(normalized.entities[0].metrics["pe_ratio"].winsorized, Some(25.0));

    let run = engine().score(date(), entities);
    let outlier = run.get("T0").unwrap();
    let cheapest = run.get("T2").unwrap();
    let pe = |r: &ScoreRecord| metric_score(r, FactorKind::Value, "pe_ratio").value().unwrap();
    assert!(pe(cheapest) > pe(outlier));
    assert!(
        cheapest.factors[&FactorKind::Value].score.value().unwrap()
            > outlier.factors[&FactorKind::Value].score.value().unwrap()
    );
}

#[test]
fn test_small_sector_falls_back_and_is_recorded() {
    let run = engine().score(date(), universe());

    let energy = run
        .diagnostics
        .fallbacks
        .iter()
        .find(|f| f.sector.as_deref() == Some("Energy"))
        .unwrap();
    assert_eq!(energy.size, 3);
    assert_eq!(run.get("ENGY00").unwrap().cohort, "Broad Market");
    assert_eq!(run.get("TECH00").unwrap().cohort, "Technology");
    assert_eq!(run.summary().fallbacks, run.diagnostics.fallbacks.len());
}

#[tokio::test]
async fn test_rerun_writes_identical_bytes() {
    let dir = std::env::temp_dir().join(format!("vantage-rerun-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let writer = JsonScoreWriter::new(&dir);
    let engine = engine();

    let file = engine.score(date(), universe()).to_file();
    writer.write(&file).await.unwrap();
    let first = std::fs::read(writer.path_for(date())).unwrap();

    let file = engine.score(date(), universe()).to_file();
    writer.write(&file).await.unwrap();
    let second = std::fs::read(writer.path_for(date())).unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    let _ = std::fs::remove_dir_all(&dir);
}
