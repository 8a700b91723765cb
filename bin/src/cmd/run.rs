//! Run command implementation.

use anyhow::{Result, bail};
use std::path::PathBuf;
use vantage::normalize::DecisionReason;
use vantage::store::{CsvMetricRepository, JsonScoreWriter};
use vantage::{Date, FactorKind, ScoringConfig, ScoringEngine, ScoringRun};

/// Score one as-of date and persist the results.
pub(crate) async fn run_scoring(
    config: ScoringConfig,
    as_of: Date,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    format: &str,
) -> Result<()> {
    if !matches!(format, "text" | "json") {
        bail!("Unknown format: {} (expected text or json)", format);
    }

    let repository = match data_dir {
        Some(dir) => CsvMetricRepository::new(dir),
        None => CsvMetricRepository::from_env()?,
    };
    let writer = match output_dir {
        Some(dir) => JsonScoreWriter::new(dir),
        None => JsonScoreWriter::from_env()?,
    };

    let engine = ScoringEngine::new(config)?;
    let run = engine.run(&repository, &writer, as_of).await?;

    if format == "json" {
        let report = serde_json::json!({
            "summary": run.summary(),
            "diagnostics": run.diagnostics,
            "output": writer.path_for(as_of),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&run, &writer);
    }

    Ok(())
}

fn print_report(run: &ScoringRun, writer: &JsonScoreWriter) {
    let summary = run.summary();

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Scoring Run                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Date:      {}", summary.as_of);
    println!("Scored:    {}", summary.scored);
    println!("Excluded:  {}", summary.excluded);
    println!("Composite: {} of {}", summary.composite_available, summary.scored);
    println!("Output:    {}", writer.path_for(run.as_of).display());
    println!();

    println!("Factor coverage:");
    println!("{}", "-".repeat(60));
    for kind in FactorKind::ALL {
        let available = summary.factor_coverage.get(&kind).copied().unwrap_or(0);
        println!("  {:20} {:>6} / {}", kind, available, summary.scored);
    }
    println!();

    let diagnostics = &run.diagnostics;
    if !diagnostics.fallbacks.is_empty() {
        println!("Broad-market fallbacks:");
        for fallback in &diagnostics.fallbacks {
            let sector = fallback.sector.as_deref().unwrap_or("(no sector)");
            println!("  {:28} {} entities", sector, fallback.size);
        }
        println!();
    }

    let switches: Vec<_> = diagnostics.strategy_switches().collect();
    if !switches.is_empty() {
        println!("Switched to percentile rank:");
        for record in switches {
            let why = match record.decision.reason {
                DecisionReason::LowDispersion { cv } => format!("low dispersion (cv {:.3})", cv),
                DecisionReason::OutputClustered { dispersion } => {
                    format!("clustered output (dispersion {:.3})", dispersion)
                }
                other => format!("{:?}", other),
            };
            println!("  {:20} {:28} {}", record.cohort, record.metric, why);
        }
        println!();
    }

    let clustered: Vec<_> = diagnostics.clustered().collect();
    if !clustered.is_empty() {
        println!("Warning: clustered z-score output");
        for record in clustered {
            println!("  {:20} {}", record.cohort, record.metric);
        }
        println!();
    }

    if diagnostics.benchmark_missing {
        println!("Warning: no benchmark returns, relative strength unavailable\n");
    }

    if !diagnostics.violations.is_empty() {
        println!("Excluded:");
        for violation in &diagnostics.violations {
            println!("  {:12} {}", violation.entity, violation.detail);
        }
        println!();
    }

    let mut ranked: Vec<_> = run
        .records
        .iter()
        .filter_map(|r| r.composite.value().map(|v| (r, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.symbol.cmp(&b.0.symbol)));

    if !ranked.is_empty() {
        println!("Top composite scores:");
        println!("{}", "-".repeat(60));
        for (record, value) in ranked.iter().take(10) {
            println!("  {:10} {:>7.2}   {}", record.symbol, value, record.cohort);
        }
        println!();
    }
}
