//! Metrics command implementation.

use anyhow::Result;
use vantage::FactorKind;
use vantage::factors::metrics_by_factor;

/// List scored metrics grouped by factor.
pub(crate) fn list_metrics(factor: Option<&str>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Metrics                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let filter = factor.map(str::parse::<FactorKind>).transpose()?;

    for kind in FactorKind::ALL {
        if filter.is_some_and(|f| f != kind) {
            continue;
        }

        println!("{} - {}", kind, kind.description());
        println!("{}", "-".repeat(60));

        for info in metrics_by_factor(&kind) {
            let mut tags = Vec::new();
            if info.direction.is_inverted() {
                tags.push("inverted");
            }
            if info.derived {
                tags.push("derived");
            }
            if info.multi_year {
                tags.push("multi-year, opt-in");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            };

            if verbose {
                println!("  {:28} - {}{}", info.name, info.description, tags);
            } else {
                println!("  {}{}", info.name, tags);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for metric descriptions.\n");
    }

    Ok(())
}
