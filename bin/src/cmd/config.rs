//! Config command implementation.

use anyhow::Result;
use vantage::ScoringConfig;

/// Print the effective configuration, defaults filled in.
pub(crate) fn print_config(config: &ScoringConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
