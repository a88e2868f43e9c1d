//! Aggregator Module
//! Groups long records by (country, bucket) and computes mean/min/max.

use crate::config::{CountrySet, Indicator, YearWindow};
use crate::data::LongRecord;
use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Years in `[1963, 1970)` form their own bucket, separate from `Decade(1960)`.
const SIXTIES_START: i32 = 1963;
const SIXTIES_END: i32 = 1970;

/// Grouping key derived from a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// 1963–1969, labelled "1960s".
    Sixties,
    Decade(i32),
    Year(i32),
}

impl BucketKey {
    pub fn start_year(self) -> i32 {
        match self {
            BucketKey::Sixties => SIXTIES_START,
            BucketKey::Decade(d) => d,
            BucketKey::Year(y) => y,
        }
    }

    fn kind_rank(self) -> u8 {
        match self {
            BucketKey::Decade(_) => 0,
            BucketKey::Sixties => 1,
            BucketKey::Year(_) => 2,
        }
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_year()
            .cmp(&other.start_year())
            .then(self.kind_rank().cmp(&other.kind_rank()))
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Sixties => f.write_str("1960s"),
            BucketKey::Decade(d) => write!(f, "{d}s"),
            BucketKey::Year(y) => write!(f, "{y}"),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decade rule: `(year / 10) * 10`, except 1963–1969 which map to [`BucketKey::Sixties`].
pub fn decade_bucket(year: i32) -> BucketKey {
    if (SIXTIES_START..SIXTIES_END).contains(&year) {
        BucketKey::Sixties
    } else {
        BucketKey::Decade(year.div_euclid(10) * 10)
    }
}

/// Year -> bucket functions used by the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucketing {
    Decade,
    /// Only the decades containing one of these years; other years are excluded.
    BenchmarkDecades(Vec<i32>),
    Year,
}

impl Bucketing {
    pub fn key(&self, year: i32) -> Option<BucketKey> {
        match self {
            Bucketing::Decade => Some(decade_bucket(year)),
            Bucketing::BenchmarkDecades(benchmarks) => {
                let key = decade_bucket(year);
                benchmarks
                    .iter()
                    .any(|&b| decade_bucket(b) == key)
                    .then_some(key)
            }
            Bucketing::Year => Some(BucketKey::Year(year)),
        }
    }
}

/// Statistics for one (country, bucket) group. All three are `None` when the
/// group has no observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub country: String,
    pub indicator: Indicator,
    pub bucket: BucketKey,
    pub observations: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A group whose every value was missing. Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDataWarning {
    pub indicator: Indicator,
    pub country: String,
    pub bucket: BucketKey,
}

impl fmt::Display for MissingDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no {} observations for {} in {}",
            self.indicator, self.country, self.bucket
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub rows: Vec<AggregateRow>,
    pub warnings: Vec<MissingDataWarning>,
    /// Bucketed records whose year lies outside the report window.
    pub out_of_window: usize,
}

impl Aggregation {
    pub fn get(&self, country: &str, bucket: BucketKey) -> Option<&AggregateRow> {
        self.rows
            .iter()
            .find(|r| r.country == country && r.bucket == bucket)
    }
}

pub struct Aggregator;

impl Aggregator {
    /// Group `records` by (country, `bucket_of(year)`) and summarise the
    /// non-missing values. Years for which `bucket_of` returns `None` are skipped.
    ///
    /// Rows come out in country-set order, then ascending bucket. Records
    /// outside `window` are still aggregated, but counted and logged.
    pub fn aggregate<F>(
        records: &[LongRecord],
        countries: &CountrySet,
        window: YearWindow,
        bucket_of: F,
    ) -> Aggregation
    where
        F: Fn(i32) -> Option<BucketKey>,
    {
        let mut groups: BTreeMap<(usize, &str, BucketKey, Indicator), Vec<f64>> = BTreeMap::new();
        let mut out_of_window = 0usize;

        for record in records {
            let Some(bucket) = bucket_of(record.year) else {
                continue;
            };
            if !window.contains(record.year) {
                out_of_window += 1;
            }
            let values = groups
                .entry((
                    countries.rank(&record.country),
                    record.country.as_str(),
                    bucket,
                    record.indicator,
                ))
                .or_default();
            if let Some(v) = record.value.filter(|v| !v.is_nan()) {
                values.push(v);
            }
        }

        if out_of_window > 0 {
            warn!(
                records = out_of_window,
                "aggregating years outside {}-{}; input was not restricted to the report window",
                window.start,
                window.end
            );
        }

        let mut aggregation = Aggregation {
            out_of_window,
            ..Aggregation::default()
        };
        for ((_, country, bucket, indicator), values) in groups {
            if values.is_empty() {
                let warning = MissingDataWarning {
                    indicator,
                    country: country.to_string(),
                    bucket,
                };
                debug!("{}", warning);
                aggregation.warnings.push(warning);
            }
            aggregation.rows.push(Self::summarise(country, indicator, bucket, &values));
        }
        if !aggregation.warnings.is_empty() {
            warn!(
                groups = aggregation.warnings.len(),
                "groups with no observations"
            );
        }
        aggregation
    }

    /// Decade summary, including the 1960s special bucket.
    pub fn by_decade(records: &[LongRecord], countries: &CountrySet, window: YearWindow) -> Aggregation {
        Self::aggregate(records, countries, window, |year| Bucketing::Decade.key(year))
    }

    /// Summary over the decades that contain a benchmark year.
    pub fn by_benchmark(
        records: &[LongRecord],
        countries: &CountrySet,
        window: YearWindow,
        benchmark_years: &[i32],
    ) -> Aggregation {
        let bucketing = Bucketing::BenchmarkDecades(benchmark_years.to_vec());
        Self::aggregate(records, countries, window, |year| bucketing.key(year))
    }

    /// One bucket per year; the (country x year) table behind the heatmaps.
    pub fn by_year(records: &[LongRecord], countries: &CountrySet, window: YearWindow) -> Aggregation {
        Self::aggregate(records, countries, window, |year| Bucketing::Year.key(year))
    }

    fn summarise(country: &str, indicator: Indicator, bucket: BucketKey, values: &[f64]) -> AggregateRow {
        let stat = |f: fn(&[f64]) -> f64| (!values.is_empty()).then(|| f(values));
        AggregateRow {
            country: country.to_string(),
            indicator,
            bucket,
            observations: values.len(),
            mean: stat(|v| Statistics::mean(v)),
            min: stat(|v| Statistics::min(v)),
            max: stat(|v| Statistics::max(v)),
        }
    }
}
