//! Merger Module
//! Full outer join of several indicators' long tables on (country, year).

use crate::config::{CountrySet, Indicator};
use crate::data::table::{LongRecord, MergedRecord};
use crate::error::JoinAmbiguityError;
use std::collections::{BTreeMap, HashSet};

pub struct Merger;

impl Merger {
    /// Every (country, year) present in any input appears exactly once in the
    /// output; indicators without a record for it stay `None`.
    ///
    /// Output is ordered by country-set order, then year, so it does not
    /// depend on the order of `inputs`.
    pub fn outer_join(
        inputs: &[Vec<LongRecord>],
        countries: &CountrySet,
    ) -> Result<Vec<MergedRecord>, JoinAmbiguityError> {
        let mut seen: HashSet<(&str, i32, Indicator)> = HashSet::new();
        let mut merged: BTreeMap<(usize, &str, i32), MergedRecord> = BTreeMap::new();

        for record in inputs.iter().flatten() {
            if !seen.insert((record.country.as_str(), record.year, record.indicator)) {
                return Err(JoinAmbiguityError {
                    indicator: record.indicator,
                    country: record.country.clone(),
                    year: record.year,
                });
            }
            merged
                .entry((countries.rank(&record.country), &record.country, record.year))
                .or_insert_with(|| MergedRecord::new(record.country.clone(), record.year))
                .set(record.indicator, record.value);
        }

        Ok(merged.into_values().collect())
    }
}
