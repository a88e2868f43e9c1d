//! Report Configuration Module
//! Fixed constants the pipeline depends on, optionally overridden from a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Canonical display and legend order.
pub const DEFAULT_COUNTRIES: [&str; 5] = ["Switzerland", "Brazil", "China", "India", "Ghana"];

pub const REPORT_START_YEAR: i32 = 1975;
pub const REPORT_END_YEAR: i32 = 2024;

pub const BENCHMARK_YEARS: [i32; 3] = [1980, 2000, 2024];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("Invalid config {}: {error}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
    #[error("Country set must not be empty")]
    EmptyCountrySet,
    #[error("Country listed twice in country set: {0}")]
    DuplicateCountry(String),
    #[error("Invalid year window: {start} > {end}")]
    InvalidWindow { start: i32, end: i32 },
    #[error("Correlation indicator list must not be empty")]
    EmptyCorrelationList,
}

/// The five socioeconomic indicators the report covers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    LifeExpectancy,
    Hdi,
    GiniCoefficient,
    PovertyRate,
    EducationIndex,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::LifeExpectancy,
        Indicator::Hdi,
        Indicator::GiniCoefficient,
        Indicator::PovertyRate,
        Indicator::EducationIndex,
    ];

    /// Display name, also used as the merged-table column header.
    pub fn name(self) -> &'static str {
        match self {
            Indicator::LifeExpectancy => "Life Expectancy",
            Indicator::Hdi => "HDI",
            Indicator::GiniCoefficient => "Gini Coefficient",
            Indicator::PovertyRate => "Poverty Rate",
            Indicator::EducationIndex => "Education Index",
        }
    }

    /// Snake-case key used in config files and artifact names.
    pub fn key(self) -> &'static str {
        match self {
            Indicator::LifeExpectancy => "life_expectancy",
            Indicator::Hdi => "hdi",
            Indicator::GiniCoefficient => "gini_coefficient",
            Indicator::PovertyRate => "poverty_rate",
            Indicator::EducationIndex => "education_index",
        }
    }

    /// Position in [`Indicator::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn default_file(self) -> String {
        format!("{}.csv", self.key())
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Indicator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Indicator::ALL
            .into_iter()
            .find(|ind| ind.key() == wanted || ind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownIndicator(s.to_string()))
    }
}

/// Ordered, duplicate-free list of the countries in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CountrySet(Vec<String>);

impl CountrySet {
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut countries: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if countries.contains(&name) {
                return Err(ConfigError::DuplicateCountry(name));
            }
            countries.push(name);
        }
        if countries.is_empty() {
            return Err(ConfigError::EmptyCountrySet);
        }
        Ok(Self(countries))
    }

    pub fn contains(&self, country: &str) -> bool {
        self.0.iter().any(|c| c == country)
    }

    pub fn position(&self, country: &str) -> Option<usize> {
        self.0.iter().position(|c| c == country)
    }

    /// Sort key: set order first, then any unknown country after, by name.
    pub fn rank(&self, country: &str) -> usize {
        self.position(country).unwrap_or(self.0.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CountrySet {
    fn default() -> Self {
        Self(DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for CountrySet {
    type Error = ConfigError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<CountrySet> for Vec<String> {
    fn from(set: CountrySet) -> Self {
        set.0
    }
}

/// Closed year interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            start: REPORT_START_YEAR,
            end: REPORT_END_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Country colours, indexed by position in the [`CountrySet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Rgb>);

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self(colors)
    }

    pub fn color_for(&self, index: usize) -> Rgb {
        if self.0.is_empty() {
            return Rgb(0, 0, 0);
        }
        self.0[index % self.0.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(vec![
            Rgb(231, 76, 60),  // Red
            Rgb(46, 204, 113), // Green
            Rgb(155, 89, 182), // Purple
            Rgb(243, 156, 18), // Orange
            Rgb(26, 188, 156), // Teal
        ])
    }
}

/// Everything the report run needs. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub countries: CountrySet,
    pub window: YearWindow,
    pub benchmark_years: Vec<i32>,
    pub correlation_indicators: Vec<Indicator>,
    pub palette: Palette,
    /// Per-indicator file names, relative to `data_dir`.
    pub inputs: BTreeMap<Indicator, PathBuf>,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub render_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            countries: CountrySet::default(),
            window: YearWindow::default(),
            benchmark_years: BENCHMARK_YEARS.to_vec(),
            correlation_indicators: Indicator::ALL.to_vec(),
            palette: Palette::default(),
            inputs: Indicator::ALL
                .into_iter()
                .map(|ind| (ind, PathBuf::from(ind.default_file())))
                .collect(),
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("output"),
            render_charts: true,
        }
    }
}

impl ReportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|error| ConfigError::Json {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        YearWindow::new(self.window.start, self.window.end)?;
        if self.correlation_indicators.is_empty() {
            return Err(ConfigError::EmptyCorrelationList);
        }
        Ok(())
    }

    /// Resolved input path for an indicator; falls back to `<key>.csv`.
    pub fn input_path(&self, indicator: Indicator) -> PathBuf {
        let file = self
            .inputs
            .get(&indicator)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(indicator.default_file()));
        self.data_dir.join(file)
    }
}
