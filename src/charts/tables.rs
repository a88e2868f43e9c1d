//! Table Writer Module
//! Writes tidy outputs as CSV (Polars) and JSON (serde_json).

use crate::charts::RenderError;
use crate::config::Indicator;
use crate::data::MergedRecord;
use crate::stats::AggregateRow;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Presentation rounding. Aggregates stay exact until they are written.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn table_error(path: &Path) -> impl FnOnce(PolarsError) -> RenderError + '_ {
    move |error| RenderError::Table {
        path: path.to_path_buf(),
        error,
    }
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<(), RenderError> {
    let mut file = File::create(path).map_err(|error| RenderError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(table_error(path))
}

/// Build the rounded summary frame: Indicator, Country, Period, N, Mean, Minimum, Maximum.
pub fn aggregate_frame(rows: &[AggregateRow]) -> PolarsResult<DataFrame> {
    let rounded = |f: fn(&AggregateRow) -> Option<f64>| -> Vec<Option<f64>> {
        rows.iter().map(|r| f(r).map(round3)).collect()
    };
    DataFrame::new(vec![
        Column::new(
            "Indicator".into(),
            rows.iter().map(|r| r.indicator.name()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Country".into(),
            rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Period".into(),
            rows.iter().map(|r| r.bucket.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "N".into(),
            rows.iter().map(|r| r.observations as u64).collect::<Vec<_>>(),
        ),
        Column::new("Mean".into(), rounded(|r| r.mean)),
        Column::new("Minimum".into(), rounded(|r| r.min)),
        Column::new("Maximum".into(), rounded(|r| r.max)),
    ])
}

pub fn write_aggregate_csv(path: &Path, rows: &[AggregateRow]) -> Result<(), RenderError> {
    let mut df = aggregate_frame(rows).map_err(table_error(path))?;
    write_csv(path, &mut df)
}

/// Merged frame: country, year, then one column per indicator display name.
pub fn merged_frame(records: &[MergedRecord]) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Column::new(
            "country".into(),
            records.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "year".into(),
            records.iter().map(|r| r.year).collect::<Vec<_>>(),
        ),
    ];
    for indicator in Indicator::ALL {
        columns.push(Column::new(
            indicator.name().into(),
            records.iter().map(|r| r.get(indicator)).collect::<Vec<_>>(),
        ));
    }
    DataFrame::new(columns)
}

pub fn write_merged_csv(path: &Path, records: &[MergedRecord]) -> Result<(), RenderError> {
    let mut df = merged_frame(records).map_err(table_error(path))?;
    write_csv(path, &mut df)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RenderError> {
    let file = File::create(path).map_err(|error| RenderError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    serde_json::to_writer_pretty(file, value).map_err(|error| RenderError::Json {
        path: path.to_path_buf(),
        error,
    })
}
