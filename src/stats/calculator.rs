//! Statistics Calculator Module
//! Descriptive statistics per (indicator, country) for distribution charts.

use crate::config::{CountrySet, Indicator};
use crate::data::LongRecord;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Distribution summary of one country's non-missing values for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDistribution {
    pub indicator: Indicator,
    pub country: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub p05: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
    pub p95: Option<f64>,
}

impl CountryDistribution {
    fn empty(indicator: Indicator, country: &str) -> Self {
        Self {
            indicator,
            country: country.to_string(),
            count: 0,
            mean: None,
            median: None,
            std: None,
            p05: None,
            p25: None,
            p75: None,
            p95: None,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(
        indicator: Indicator,
        country: &str,
        values: &[f64],
    ) -> CountryDistribution {
        let n = values.len();
        if n == 0 {
            return CountryDistribution::empty(indicator, country);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = Statistics::mean(values);
        // sample standard deviation; a single value has no spread
        let std = if n > 1 { Statistics::std_dev(values) } else { 0.0 };

        CountryDistribution {
            indicator,
            country: country.to_string(),
            count: n,
            mean: Some(mean),
            median: Some(Self::percentile(&sorted, 50.0)),
            std: Some(std),
            p05: Some(Self::percentile(&sorted, 5.0)),
            p25: Some(Self::percentile(&sorted, 25.0)),
            p75: Some(Self::percentile(&sorted, 75.0)),
            p95: Some(Self::percentile(&sorted, 95.0)),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// One summary per country in set order, for a single indicator's records.
    /// Countries with no observations still get a row, with count 0.
    pub fn country_distributions(
        records: &[LongRecord],
        indicator: Indicator,
        countries: &CountrySet,
    ) -> Vec<CountryDistribution> {
        countries
            .iter()
            .map(|country| {
                let values: Vec<f64> = records
                    .iter()
                    .filter(|r| r.indicator == indicator && r.country == country)
                    .filter_map(|r| r.value)
                    .filter(|v| !v.is_nan())
                    .collect();
                Self::compute_descriptive_stats(indicator, country, &values)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numpy_style_percentiles() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 3.0);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 2.0);
        assert!((StatsCalculator::percentile(&sorted, 95.0) - 4.8).abs() < 1e-12);
    }

    #[test]
    fn descriptive_stats() {
        let d = StatsCalculator::compute_descriptive_stats(Indicator::Hdi, "Ghana", &[4.0, 2.0, 6.0]);
        assert_eq!(d.count, 3);
        assert!((d.mean.unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(d.median, Some(4.0));
        assert!((d.std.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let d = StatsCalculator::compute_descriptive_stats(Indicator::Hdi, "Ghana", &[0.5]);
        assert_eq!(d.std, Some(0.0));
        assert_eq!(d.p05, Some(0.5));
        assert_eq!(d.p95, Some(0.5));
    }

    #[test]
    fn every_country_gets_a_row() {
        let countries = CountrySet::new(["Switzerland", "Ghana"]).unwrap();
        let records = vec![
            LongRecord {
                country: "Ghana".into(),
                year: 2000,
                indicator: Indicator::PovertyRate,
                value: Some(30.0),
            },
            LongRecord {
                country: "Ghana".into(),
                year: 2001,
                indicator: Indicator::PovertyRate,
                value: None,
            },
        ];
        let dists = StatsCalculator::country_distributions(&records, Indicator::PovertyRate, &countries);
        assert_eq!(dists.len(), 2);
        assert_eq!(dists[0].country, "Switzerland");
        assert_eq!(dists[0].count, 0);
        assert_eq!(dists[0].mean, None);
        assert_eq!(dists[1].count, 1);
        assert_eq!(dists[1].p95, Some(30.0));
    }
}
