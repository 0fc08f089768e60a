//! Portfolio Analyzer command line.
//!
//! ```bash
//! # demo portfolio, manual prices
//! portfolio-analyzer report --sample
//!
//! # your own holdings, market quotes, risk and a 6-month history
//! portfolio-analyzer report --file holdings.csv --live --risk --history AAPL,VTI --period 6m
//!
//! # interactive dashboard
//! portfolio-analyzer dashboard --file holdings.csv --log-file analyzer.log
//! ```

mod report;
mod tui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_analyzer_core::models::chart::HistoricalPeriod;
use portfolio_analyzer_core::models::holding::AssetCategory;
use portfolio_analyzer_core::models::settings::Settings;
use portfolio_analyzer_core::PortfolioAnalyzer;

const DEFAULT_LOG_FILTER: &str = "warn,portfolio_analyzer_core=info";

#[derive(Parser, Debug)]
#[command(name = "portfolio-analyzer", version, about = "Analyze an investment portfolio")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true, env = "PORTFOLIO_ANALYZER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print metrics, allocation, performance and details
    Report {
        #[command(flatten)]
        source: Source,

        /// Only include these categories (repeatable)
        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<AssetCategory>,

        /// Fetch market quotes even for holdings with a manual price
        #[arg(long)]
        live: bool,

        /// Add the risk vs. return table
        #[arg(long)]
        risk: bool,

        /// Comma-separated symbols for the historical comparison
        #[arg(long, value_delimiter = ',', value_name = "SYMBOLS")]
        history: Vec<String>,

        /// Lookback for --history (1m, 3m, 6m, 1y, 2y, 5y)
        #[arg(long)]
        period: Option<HistoricalPeriod>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal dashboard
    Dashboard {
        #[command(flatten)]
        source: Source,

        /// Write logs here (nothing is logged to the terminal)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Write the CSV import template
    Template {
        /// Destination file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Where the holdings come from. Defaults to the demo portfolio.
#[derive(Args, Debug)]
struct Source {
    /// Holdings CSV (Asset, Category, Quantity, Purchase Price, Current Price)
    #[arg(long, short, conflicts_with = "sample")]
    file: Option<PathBuf>,

    /// Use the built-in demo portfolio
    #[arg(long)]
    sample: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Dashboard { log_file, .. } => init_tracing(log_file.as_deref(), true)?,
        _ => init_tracing(None, false)?,
    }

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    tracing::debug!(
        config = ?cli.config,
        prefer_market_prices = settings.prefer_market_prices,
        "settings loaded"
    );

    match cli.command {
        Commands::Report {
            source,
            categories,
            live,
            risk,
            history,
            period,
            json,
        } => {
            let settings = Settings {
                prefer_market_prices: settings.prefer_market_prices || live,
                ..settings
            };
            let period = period.unwrap_or(settings.default_period);
            let analyzer = load_analyzer(settings, &source)?;
            let options = report::ReportOptions {
                categories,
                risk,
                history,
                period,
                json,
            };
            report::run(&analyzer, &options).await
        }
        Commands::Dashboard { source, .. } => {
            let analyzer = load_analyzer(settings, &source)?;
            tui::run(analyzer).await
        }
        Commands::Template { output } => write_template(output.as_deref()),
    }
}

/// Logs go to stderr, or to `log_file` when given. With `quiet` and no
/// file nothing is written, so a full-screen UI stays intact.
fn init_tracing(log_file: Option<&Path>, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let writer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None if quiet => BoxMakeWriter::new(std::io::sink),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(log_file.is_none()))
        .init();
    Ok(())
}

fn load_analyzer(settings: Settings, source: &Source) -> Result<PortfolioAnalyzer> {
    let Some(path) = &source.file else {
        return Ok(PortfolioAnalyzer::with_sample_data(settings));
    };

    let mut analyzer = PortfolioAnalyzer::new(settings);
    let imported = analyzer
        .import_csv_file(path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        holdings = analyzer.holdings().len(),
        skipped = imported.skipped.len(),
        "portfolio imported"
    );
    for skipped in &imported.skipped {
        eprintln!("warning: line {} skipped: {}", skipped.line, skipped.reason);
    }
    if imported.merged > 0 {
        eprintln!("note: {} duplicate rows merged", imported.merged);
    }
    Ok(analyzer)
}

fn write_template(output: Option<&Path>) -> Result<()> {
    let template = PortfolioAnalyzer::with_registry(
        Settings::default(),
        portfolio_analyzer_core::providers::registry::PriceProviderRegistry::new(),
    )
    .template_csv()
    .context("failed to build the CSV template")?;

    match output {
        Some(path) => {
            std::fs::write(path, template)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("template written to {}", path.display());
        }
        None => print!("{template}"),
    }
    Ok(())
}
