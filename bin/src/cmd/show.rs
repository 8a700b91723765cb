//! Show command implementation.

use anyhow::Result;
use std::path::PathBuf;
use vantage::Date;
use vantage::store::{JsonScoreWriter, ScoreFile, ScoreRecord};

/// Show persisted scores for the given symbols.
pub(crate) async fn show_scores(
    symbols: &[String],
    as_of: Date,
    output_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let writer = match output_dir {
        Some(dir) => JsonScoreWriter::new(dir),
        None => JsonScoreWriter::from_env()?,
    };
    let file = writer.read(as_of).await?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Factor Scores                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Date: {}\n", file.as_of);

    let selected: Vec<_> = if symbols.is_empty() {
        file.records.iter().collect()
    } else {
        symbols
            .iter()
            .filter_map(|symbol| {
                let record = find_record(&file, symbol);
                if record.is_none() {
                    println!("{}: no score record\n", symbol);
                }
                record
            })
            .collect()
    };

    for record in selected {
        println!("{} ({})", record.symbol, record.cohort);
        println!("{}", "-".repeat(60));
        println!("  {:20} {}", "composite", record.composite);

        for (kind, factor) in &record.factors {
            let weight = record
                .composite_weights
                .get(kind)
                .map(|w| format!("{:.1}%", w * 100.0))
                .unwrap_or_default();
            println!("  {:20} {:18} {}", kind.to_string(), factor.score.to_string(), weight);

            if verbose {
                for metric in &factor.metrics {
                    let raw = metric
                        .raw
                        .map(|v| format!("{:.4}", v))
                        .unwrap_or_else(|| "-".to_string());
                    let strategy = metric
                        .strategy
                        .map(|s| s.to_string())
                        .unwrap_or_default();
                    let inverted = if metric.inverted { " (inverted)" } else { "" };
                    println!(
                        "      {:26} raw {:>12}  score {:18} {}{}",
                        metric.metric,
                        raw,
                        metric.normalized.to_string(),
                        strategy,
                        inverted
                    );
                }
            }
        }
        println!();
    }

    Ok(())
}

/// Look up `symbol` as given, then upper-cased.
fn find_record<'a>(file: &'a ScoreFile, symbol: &str) -> Option<&'a ScoreRecord> {
    file.get(symbol).or_else(|| file.get(&symbol.to_uppercase()))
}
