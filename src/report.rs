//! Report Pipeline Module
//! load -> select -> reshape -> aggregate -> merge -> correlate -> present

use crate::charts::{tables, Presenter, RenderError, SvgPresenter};
use crate::config::{Indicator, ReportConfig};
use crate::data::{DataLoader, LongRecord, MergedRecord, Merger, Reshaper, Selector, WideTable};
use crate::error::PipelineError;
use crate::stats::{
    AggregateRow, Aggregation, Aggregator, CorrelationCalculator, CorrelationMatrix,
    CountryDistribution, StatsCalculator,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Everything derived from one indicator's table.
#[derive(Debug, Clone)]
pub struct IndicatorReport {
    pub indicator: Indicator,
    pub table: WideTable,
    pub records: Vec<LongRecord>,
    /// Per-year means; the table behind the yearly heatmap.
    pub years: Aggregation,
    pub decades: Aggregation,
    pub benchmarks: Aggregation,
    pub distributions: Vec<CountryDistribution>,
}

#[derive(Debug, Clone)]
pub struct ReportData {
    pub indicators: Vec<IndicatorReport>,
    pub merged: Vec<MergedRecord>,
    pub correlation: CorrelationMatrix,
}

impl ReportData {
    pub fn indicator(&self, indicator: Indicator) -> Option<&IndicatorReport> {
        self.indicators.iter().find(|r| r.indicator == indicator)
    }

    /// Benchmark rows of every indicator, in indicator order.
    pub fn benchmark_rows(&self) -> Vec<AggregateRow> {
        self.indicators
            .iter()
            .flat_map(|r| r.benchmarks.rows.iter().cloned())
            .collect()
    }

    pub fn warning_count(&self) -> usize {
        self.indicators
            .iter()
            .map(|r| r.decades.warnings.len() + r.benchmarks.warnings.len())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSummary {
    pub indicator: Indicator,
    pub source: String,
    pub countries: usize,
    pub years: usize,
    pub records: usize,
    pub missing_cells: usize,
    pub missing_data_warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub indicators: Vec<IndicatorSummary>,
    pub merged_rows: usize,
    pub artifacts: Vec<PathBuf>,
}

/// Select, reshape and summarise one raw indicator table.
pub fn prepare_indicator(
    table: &WideTable,
    indicator: Indicator,
    config: &ReportConfig,
) -> Result<IndicatorReport, PipelineError> {
    let selected = Selector::select(table, &config.countries, config.window)?;
    let records = Reshaper::stack_to_long(&selected, indicator)?;
    let years = Aggregator::by_year(&records, &config.countries, config.window);
    let decades = Aggregator::by_decade(&records, &config.countries, config.window);
    let benchmarks = Aggregator::by_benchmark(
        &records,
        &config.countries,
        config.window,
        &config.benchmark_years,
    );
    let distributions = StatsCalculator::country_distributions(&records, indicator, &config.countries);

    info!(
        indicator = indicator.key(),
        countries = selected.row_count(),
        years = selected.column_count(),
        records = records.len(),
        missing = selected.missing_cells(),
        "indicator prepared"
    );

    Ok(IndicatorReport {
        indicator,
        table: selected,
        records,
        years,
        decades,
        benchmarks,
        distributions,
    })
}

/// Pure part of the report: no I/O.
pub fn build_report(
    tables: &[(Indicator, WideTable)],
    config: &ReportConfig,
) -> Result<ReportData, PipelineError> {
    let indicators = tables
        .iter()
        .map(|(indicator, table)| prepare_indicator(table, *indicator, config))
        .collect::<Result<Vec<_>, _>>()?;

    let long_tables: Vec<Vec<LongRecord>> = indicators.iter().map(|r| r.records.clone()).collect();
    let merged = Merger::outer_join(&long_tables, &config.countries)?;
    let correlation =
        CorrelationCalculator::pairwise_complete(&merged, &config.correlation_indicators);

    info!(merged_rows = merged.len(), "indicators merged");
    Ok(ReportData {
        indicators,
        merged,
        correlation,
    })
}

pub fn load_tables(config: &ReportConfig) -> Result<Vec<(Indicator, WideTable)>, PipelineError> {
    Indicator::ALL
        .into_iter()
        .map(|indicator| {
            let path = config.input_path(indicator);
            info!(indicator = indicator.key(), path = %path.display(), "loading");
            Ok((indicator, DataLoader::load_csv(&path)?))
        })
        .collect()
}

/// Hand every table to the presenter and write the JSON/CSV side outputs.
pub fn present(
    data: &ReportData,
    presenter: &dyn Presenter,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>, PipelineError> {
    let window = format!("{}-{}", config.window.start, config.window.end);

    let per_indicator = data
        .indicators
        .par_iter()
        .map(|r| -> Result<Vec<PathBuf>, RenderError> {
            let name = r.indicator.name();
            let key = r.indicator.key();
            let mut paths = Vec::new();
            if config.render_charts {
                paths.push(presenter.line_chart(
                    r.indicator,
                    &r.records,
                    &format!("{name} ({window})"),
                )?);
                paths.push(presenter.heatmap(
                    &format!("{key}_heatmap"),
                    &r.years.rows,
                    &format!("{name} by year"),
                )?);
                paths.push(presenter.heatmap(
                    &format!("{key}_decade_heatmap"),
                    &r.decades.rows,
                    &format!("{name} by decade"),
                )?);
                paths.push(presenter.distribution_chart(
                    r.indicator,
                    &r.distributions,
                    &format!("{name} distribution ({window})"),
                )?);
            }
            paths.push(presenter.summary_table(&format!("{key}_decades"), &r.decades.rows)?);
            Ok(paths)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut artifacts: Vec<PathBuf> = per_indicator.into_iter().flatten().collect();
    artifacts.push(presenter.summary_table("benchmark_summary", &data.benchmark_rows())?);
    if config.render_charts {
        artifacts.push(
            presenter.correlation_heatmap(&data.correlation, "Indicator correlation")?,
        );
    }

    let merged_path = config.out_dir.join("merged.csv");
    tables::write_merged_csv(&merged_path, &data.merged)?;
    artifacts.push(merged_path);

    let correlation_path = config.out_dir.join("correlation.json");
    tables::write_json(&correlation_path, &data.correlation)?;
    artifacts.push(correlation_path);

    let distributions: Vec<&CountryDistribution> = data
        .indicators
        .iter()
        .flat_map(|r| r.distributions.iter())
        .collect();
    let distribution_path = config.out_dir.join("distribution.json");
    tables::write_json(&distribution_path, &distributions)?;
    artifacts.push(distribution_path);

    Ok(artifacts)
}

pub fn summarise(data: &ReportData, artifacts: Vec<PathBuf>) -> ReportSummary {
    ReportSummary {
        indicators: data
            .indicators
            .iter()
            .map(|r| IndicatorSummary {
                indicator: r.indicator,
                source: r.table.source().to_string(),
                countries: r.table.row_count(),
                years: r.table.column_count(),
                records: r.records.len(),
                missing_cells: r.table.missing_cells(),
                missing_data_warnings: r.decades.warnings.len() + r.benchmarks.warnings.len(),
            })
            .collect(),
        merged_rows: data.merged.len(),
        artifacts,
    }
}

/// Full run: load the five inputs, build, render into `config.out_dir`,
/// and write `report.json`.
pub fn run_report(config: &ReportConfig) -> Result<ReportSummary, PipelineError> {
    config.validate()?;
    fs::create_dir_all(&config.out_dir).map_err(|error| RenderError::Io {
        path: config.out_dir.clone(),
        error,
    })?;

    let tables = load_tables(config)?;
    let data = build_report(&tables, config)?;
    let presenter = SvgPresenter::new(&config.out_dir, config.countries.clone(), config.palette.clone());
    let mut artifacts = present(&data, &presenter, config)?;

    let report_path = config.out_dir.join("report.json");
    artifacts.push(report_path.clone());
    let summary = summarise(&data, artifacts);
    tables::write_json(&report_path, &summary)?;

    info!(
        artifacts = summary.artifacts.len(),
        warnings = data.warning_count(),
        out_dir = %config.out_dir.display(),
        "report written"
    );
    Ok(summary)
}
