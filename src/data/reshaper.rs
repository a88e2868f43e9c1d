//! Reshaper Module
//! Stacks a wide table into long (country, year, indicator, value) records.

use crate::config::Indicator;
use crate::data::table::{LongRecord, WideTable, YearSchema};
use crate::error::SchemaError;
use std::borrow::Cow;

pub struct Reshaper;

impl Reshaper {
    /// Transform a wide table to long format (stack operation).
    ///
    /// Emits one record per (country, year column) cell, gaps included as
    /// `value: None`. Uses the table's year schema when the Selector attached
    /// one; otherwise every column label must parse as a year.
    pub fn stack_to_long(
        table: &WideTable,
        indicator: Indicator,
    ) -> Result<Vec<LongRecord>, SchemaError> {
        let schema = match table.year_schema() {
            Some(schema) => Cow::Borrowed(schema),
            None => Cow::Owned(YearSchema::parse_strict(table)?),
        };

        let mut records = Vec::with_capacity(table.row_count() * schema.len());
        for row in table.rows() {
            for column in schema.columns() {
                records.push(LongRecord {
                    country: row.country.clone(),
                    year: column.year,
                    indicator,
                    value: row.values.get(column.position).copied().flatten(),
                });
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CountrySet, YearWindow};
    use crate::data::selector::Selector;
    use crate::data::table::WideRow;

    #[test]
    fn one_record_per_cell_including_gaps() {
        let table = WideTable::from_years(
            "gini.csv",
            &[1980, 1981, 1982],
            vec![
                WideRow::new("Ghana", vec![Some(0.40), None, Some(0.41)]),
                WideRow::new("Switzerland", vec![None, None, None]),
            ],
        )
        .unwrap();

        let long = Reshaper::stack_to_long(&table, Indicator::GiniCoefficient).unwrap();
        assert_eq!(long.len(), table.row_count() * table.column_count());
        assert_eq!(long[1].country, "Ghana");
        assert_eq!(long[1].year, 1981);
        assert_eq!(long[1].value, None);
        assert_eq!(long[2].value, Some(0.41));
        assert!(long.iter().all(|r| r.indicator == Indicator::GiniCoefficient));
        assert_eq!(long.iter().filter(|r| r.country == "Switzerland").count(), 3);
    }

    #[test]
    fn uses_selector_schema() {
        let raw = WideTable::new(
            "hdi.csv",
            Some("Country".into()),
            vec!["Code".into(), "1990".into(), "1991".into()],
            vec![WideRow::new("India", vec![None, Some(0.43), Some(0.44)])],
        )
        .unwrap();
        let selected =
            Selector::select(&raw, &CountrySet::default(), YearWindow::default()).unwrap();

        let long = Reshaper::stack_to_long(&selected, Indicator::Hdi).unwrap();
        assert_eq!(long.len(), 2);
        assert_eq!((long[0].year, long[0].value), (1990, Some(0.43)));
    }

    #[test]
    fn unparseable_label_without_schema_is_fatal() {
        let raw = WideTable::new(
            "hdi.csv",
            Some("Country".into()),
            vec!["1990".into(), "Code".into()],
            vec![WideRow::new("India", vec![Some(0.43), None])],
        )
        .unwrap();
        let err = Reshaper::stack_to_long(&raw, Indicator::Hdi).unwrap_err();
        assert_eq!(err.column, "Code");
        assert_eq!(err.table, "hdi.csv");
    }
}
