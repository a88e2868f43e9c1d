//! CSV Data Loader Module
//! Reads wide indicator tables (one row per country, one column per year) using Polars.

use crate::data::table::{parse_year_label, WideRow, WideTable};
use crate::error::SchemaError;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV {path}: {error}")]
    CsvError {
        path: String,
        #[source]
        error: PolarsError,
    },
    #[error("Failed to read column `{column}` of {table}: {error}")]
    ColumnError {
        table: String,
        column: String,
        #[source]
        error: PolarsError,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Converts delimited files and in-memory DataFrames into [`WideTable`]s.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    ///
    /// Cells that are empty or do not parse as numbers become missing values.
    pub fn load_csv(path: &Path) -> Result<WideTable, LoaderError> {
        let label = path.display().to_string();

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|error| LoaderError::CsvError {
                path: label.clone(),
                error,
            })?;

        debug!(
            path = %label,
            rows = df.height(),
            columns = df.width(),
            "read csv"
        );
        Self::from_dataframe(&label, &df)
    }

    /// Convert a DataFrame whose first column holds country names.
    ///
    /// A frame with no columns, or whose first column label is a year, has no
    /// country column; the result keeps its labels but no rows, and the
    /// Selector rejects it.
    pub fn from_dataframe(source: &str, df: &DataFrame) -> Result<WideTable, LoaderError> {
        let columns = df.get_columns();
        let labels: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

        let Some((country_col, value_cols)) = columns.split_first() else {
            return Ok(WideTable::new(source, None, labels, Vec::new())?);
        };
        let country_label = country_col.name().to_string();
        if parse_year_label(&country_label).is_some() {
            warn!(table = source, "first column `{}` is a year, not a country column", country_label);
            return Ok(WideTable::new(source, None, labels, Vec::new())?);
        }

        let column_err = |column: &str| {
            let table = source.to_string();
            let column = column.to_string();
            move |error: PolarsError| LoaderError::ColumnError {
                table,
                column,
                error,
            }
        };

        let countries: Vec<Option<String>> = country_col
            .cast(&DataType::String)
            .and_then(|c| {
                c.as_materialized_series()
                    .str()
                    .map(|ca| ca.into_iter().map(|v| v.map(str::to_string)).collect())
            })
            .map_err(column_err(&country_label))?;

        let mut value_columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(value_cols.len());
        for col in value_cols {
            let name = col.name().to_string();
            let values: Vec<Option<f64>> = col
                .cast(&DataType::Float64)
                .and_then(|c| {
                    c.as_materialized_series()
                        .f64()
                        .map(|ca| ca.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
                })
                .map_err(column_err(&name))?;
            value_columns.push(values);
        }

        let mut rows = Vec::with_capacity(df.height());
        for (i, country) in countries.into_iter().enumerate() {
            let country = country.map(|c| c.trim().to_string()).unwrap_or_default();
            if country.is_empty() {
                warn!(table = source, row = i, "skipping row without a country name");
                continue;
            }
            let values = value_columns.iter().map(|col| col[i]).collect();
            rows.push(WideRow::new(country, values));
        }

        Ok(WideTable::new(
            source,
            Some(country_label),
            labels[1..].to_vec(),
            rows,
        )?)
    }
}
