//! vantage CLI binary.
//!
//! Provides a command-line interface for the vantage scoring engine.

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vantage::ScoringConfig;
use vantage::traits::types::parse_date;
use vantage::{Date, VantageError};

const DEFAULT_LOG_FILTER: &str =
    "vantage=info,vantage_normalize=info,vantage_factors=info,vantage_store=info";

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Sector-relative factor scoring for equities", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file (overrides VANTAGE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the universe for one as-of date and persist the results
    Run {
        /// As-of date (YYYY-MM-DD, defaults to config or today)
        #[arg(short, long)]
        date: Option<String>,

        /// Directory holding metric CSV files (overrides VANTAGE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory for score files (overrides VANTAGE_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show persisted scores for symbols
    Show {
        /// Ticker symbols
        #[arg(value_delimiter = ',')]
        symbols: Vec<String>,

        /// As-of date (YYYY-MM-DD, defaults to config or today)
        #[arg(short, long)]
        date: Option<String>,

        /// Directory holding score files (overrides VANTAGE_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show per-metric drill-down
        #[arg(short, long)]
        verbose: bool,
    },

    /// List scored metrics by factor
    Metrics {
        /// Filter by factor
        #[arg(short, long)]
        factor: Option<String>,

        /// Show direction and description
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Try to load .env file (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    match cli.command {
        Commands::Run {
            date,
            data_dir,
            output_dir,
            format,
        } => {
            let config = load_config(cli.config)?;
            let as_of = resolve_date(date.as_deref(), &config)?;
            cmd::run::run_scoring(config, as_of, data_dir, output_dir, &format).await?;
        }
        Commands::Show {
            symbols,
            date,
            output_dir,
            verbose,
        } => {
            let config = load_config(cli.config)?;
            let as_of = resolve_date(date.as_deref(), &config)?;
            cmd::show::show_scores(&symbols, as_of, output_dir, verbose).await?;
        }
        Commands::Metrics { factor, verbose } => {
            cmd::metrics::list_metrics(factor.as_deref(), verbose)?;
        }
        Commands::Config => {
            let config = load_config(cli.config)?;
            cmd::config::print_config(&config)?;
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber on stderr.
fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

fn load_config(path: Option<PathBuf>) -> Result<ScoringConfig, VantageError> {
    match path {
        Some(path) => ScoringConfig::load(path),
        None => ScoringConfig::from_env(),
    }
}

fn resolve_date(date: Option<&str>, config: &ScoringConfig) -> Result<Date, VantageError> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(config.resolve_as_of()),
    }
}
