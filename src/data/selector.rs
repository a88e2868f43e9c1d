//! Row/Column Selector Module
//! Restricts a wide table to the report's country set and year window.

use crate::config::{CountrySet, YearWindow};
use crate::data::table::{parse_year_label, WideRow, WideTable, YearColumn, YearSchema};
use crate::error::SchemaError;
use std::collections::HashSet;
use tracing::debug;

pub struct Selector;

impl Selector {
    /// Keep rows whose country is in `countries` and columns whose label is a
    /// year inside `window`. Input row and column order is preserved.
    ///
    /// The result carries the [`YearSchema`] of its columns and has exactly
    /// one row per kept country; a repeated country is a [`SchemaError`].
    pub fn select(
        table: &WideTable,
        countries: &CountrySet,
        window: YearWindow,
    ) -> Result<WideTable, SchemaError> {
        let Some(country_column) = table.country_column() else {
            let first = table.columns().first().cloned().unwrap_or_default();
            return Err(SchemaError::new(
                table.source(),
                first,
                "table has no country-identifying first column",
            ));
        };

        let kept: Vec<(usize, i32)> = table
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                parse_year_label(label)
                    .filter(|year| window.contains(*year))
                    .map(|year| (i, year))
            })
            .collect();

        let rows: Vec<WideRow> = table
            .rows()
            .iter()
            .filter(|row| countries.contains(&row.country))
            .map(|row| {
                let values = kept.iter().map(|&(i, _)| row.values[i]).collect();
                WideRow::new(row.country.clone(), values)
            })
            .collect();

        let mut seen = HashSet::with_capacity(rows.len());
        if let Some(row) = rows.iter().find(|row| !seen.insert(row.country.clone())) {
            return Err(SchemaError::new(
                table.source(),
                country_column,
                format!("more than one row for country `{}`", row.country),
            ));
        }

        debug!(
            table = table.source(),
            rows_in = table.row_count(),
            rows_out = rows.len(),
            columns_in = table.column_count(),
            columns_out = kept.len(),
            "selected"
        );

        let columns = kept.iter().map(|&(i, _)| table.columns()[i].clone()).collect();
        let schema = YearSchema::new(
            kept.iter()
                .enumerate()
                .map(|(position, &(_, year))| YearColumn { position, year })
                .collect(),
        );

        Ok(WideTable::new(
            table.source(),
            Some(country_column.to_string()),
            columns,
            rows,
        )?
        .with_year_schema(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> WideTable {
        WideTable::new(
            "life.csv",
            Some("Country Name".into()),
            vec![
                "Country Code".into(),
                "1960".into(),
                "1975".into(),
                "2000".into(),
                "2024".into(),
                "2025".into(),
            ],
            vec![
                WideRow::new("Ghana", vec![None, Some(45.0), Some(50.0), Some(57.0), Some(64.0), None]),
                WideRow::new("World", vec![None, Some(52.0), Some(58.0), Some(67.0), Some(73.0), None]),
                WideRow::new("Switzerland", vec![None, Some(71.0), Some(75.0), Some(80.0), Some(84.0), None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn keeps_only_countries_and_window_years() {
        let countries = CountrySet::new(["Switzerland", "Ghana"]).unwrap();
        let selected =
            Selector::select(&raw_table(), &countries, YearWindow::new(1975, 2024).unwrap())
                .unwrap();

        assert_eq!(selected.columns(), ["1975", "2000", "2024"]);
        assert_eq!(selected.row_count(), 2);
        assert_eq!(selected.column_count(), 3);
        // filtering does not reorder rows
        assert_eq!(selected.rows()[0].country, "Ghana");
        assert_eq!(selected.rows()[1].country, "Switzerland");
        assert_eq!(selected.rows()[1].values, vec![Some(75.0), Some(80.0), Some(84.0)]);

        let schema = selected.year_schema().unwrap();
        assert_eq!(schema.years().collect::<Vec<_>>(), vec![1975, 2000, 2024]);
        assert_eq!(schema.columns()[2].position, 2);
    }

    #[test]
    fn every_selected_column_is_a_window_year() {
        let window = YearWindow::new(1975, 2024).unwrap();
        let selected = Selector::select(&raw_table(), &CountrySet::default(), window).unwrap();
        assert!(selected
            .columns()
            .iter()
            .all(|c| parse_year_label(c).is_some_and(|y| window.contains(y))));
        assert!(selected
            .rows()
            .iter()
            .all(|r| CountrySet::default().contains(&r.country)));
    }

    #[test]
    fn missing_country_column_is_schema_error() {
        let table = WideTable::new(
            "poverty.csv",
            None,
            vec!["1980".into()],
            Vec::new(),
        )
        .unwrap();
        let err = Selector::select(&table, &CountrySet::default(), YearWindow::default())
            .unwrap_err();
        assert_eq!(err.table, "poverty.csv");
        assert_eq!(err.column, "1980");
    }

    #[test]
    fn repeated_country_row_is_rejected() {
        let table = WideTable::from_years(
            "gini.csv",
            &[1980],
            vec![
                WideRow::new("Ghana", vec![Some(0.4)]),
                WideRow::new("Switzerland", vec![Some(0.33)]),
                WideRow::new("Ghana", vec![Some(0.5)]),
            ],
        )
        .unwrap();
        let countries = CountrySet::new(["Switzerland", "Ghana"]).unwrap();
        let err = Selector::select(&table, &countries, YearWindow::default()).unwrap_err();
        assert_eq!(err.table, "gini.csv");
        assert_eq!(err.column, "Country");
        assert!(err.reason.contains("Ghana"));
    }

    #[test]
    fn repeated_row_outside_country_set_is_dropped() {
        let table = WideTable::from_years(
            "gini.csv",
            &[1980],
            vec![
                WideRow::new("Norway", vec![Some(0.25)]),
                WideRow::new("Ghana", vec![Some(0.4)]),
                WideRow::new("Norway", vec![Some(0.26)]),
            ],
        )
        .unwrap();
        let countries = CountrySet::new(["Ghana"]).unwrap();
        let selected = Selector::select(&table, &countries, YearWindow::default()).unwrap();
        assert_eq!(selected.row_count(), 1);
    }
}
