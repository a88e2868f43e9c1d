//! Table Types Module
//! Wide (country x year) and long (one observation per row) representations.

use crate::config::Indicator;
use crate::error::SchemaError;
use serde::Serialize;

/// Parse a column label as a year. Labels that are not integers are not years.
pub fn parse_year_label(label: &str) -> Option<i32> {
    label.trim().parse::<i32>().ok()
}

/// One country row of a wide table; `values` lines up with the table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

impl WideRow {
    pub fn new(country: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            country: country.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearColumn {
    pub position: usize,
    pub year: i32,
}

/// The recognised year columns of a table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSchema {
    columns: Vec<YearColumn>,
}

impl YearSchema {
    pub fn new(columns: Vec<YearColumn>) -> Self {
        Self { columns }
    }

    /// Every column label must be a year.
    pub fn parse_strict(table: &WideTable) -> Result<Self, SchemaError> {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(position, label)| {
                parse_year_label(label)
                    .map(|year| YearColumn { position, year })
                    .ok_or_else(|| {
                        SchemaError::new(table.source(), label.as_str(), "column label is not a year")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[YearColumn] {
        &self.columns
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.columns.iter().map(|c| c.year)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An indicator table in wide format: one row per country, one column per label.
///
/// Immutable once built. The Selector attaches a [`YearSchema`] so later stages
/// never have to guess which columns are years.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    source: String,
    country_column: Option<String>,
    columns: Vec<String>,
    rows: Vec<WideRow>,
    year_schema: Option<YearSchema>,
}

impl WideTable {
    pub fn new(
        source: impl Into<String>,
        country_column: Option<String>,
        columns: Vec<String>,
        rows: Vec<WideRow>,
    ) -> Result<Self, SchemaError> {
        let source = source.into();
        if let Some(row) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(SchemaError::new(
                source,
                row.country.as_str(),
                format!(
                    "row has {} values but the table has {} columns",
                    row.values.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self {
            source,
            country_column,
            columns,
            rows,
            year_schema: None,
        })
    }

    /// Convenience constructor for a table whose data columns are all years.
    pub fn from_years(
        source: impl Into<String>,
        years: &[i32],
        rows: Vec<WideRow>,
    ) -> Result<Self, SchemaError> {
        let columns = years.iter().map(|y| y.to_string()).collect();
        Self::new(source, Some("Country".to_string()), columns, rows)
    }

    pub(crate) fn with_year_schema(mut self, schema: YearSchema) -> Self {
        self.year_schema = Some(schema);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn country_column(&self) -> Option<&str> {
        self.country_column.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[WideRow] {
        &self.rows
    }

    pub fn year_schema(&self) -> Option<&YearSchema> {
        self.year_schema.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn missing_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.values.iter().filter(|v| v.is_none()).count())
            .sum()
    }
}

/// One (country, year, indicator) observation; `value` is `None` for a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub country: String,
    pub year: i32,
    pub indicator: Indicator,
    pub value: Option<f64>,
}

/// One (country, year) row with a slot per indicator, ordered as [`Indicator::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub country: String,
    pub year: i32,
    pub values: [Option<f64>; 5],
}

impl MergedRecord {
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
            values: [None; 5],
        }
    }

    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        self.values[indicator.index()]
    }

    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        self.values[indicator.index()] = value;
    }
}
