//! devtrends - Socioeconomic Indicator Report
//!
//! Command-line entry point: builds the report from five indicator CSV files.

use anyhow::{Context, Result};
use clap::Parser;
use devtrends::{run_report, ReportConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "devtrends", version, about = "Socioeconomic indicator report")]
struct Cli {
    /// JSON config file; any field left out keeps its default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the indicator CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the charts and tables are written to
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Only write tables, skip SVG charts
    #[arg(long)]
    no_charts: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.out_dir {
        config.out_dir = dir;
    }
    if cli.no_charts {
        config.render_charts = false;
    }

    let summary = run_report(&config).context("report failed")?;
    info!(
        artifacts = summary.artifacts.len(),
        merged_rows = summary.merged_rows,
        "done"
    );
    Ok(())
}
