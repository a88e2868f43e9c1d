//! devtrends - Socioeconomic Indicator Report
//!
//! Loads wide country x year indicator tables, reshapes them to long format,
//! aggregates by decade and benchmark year, joins indicators and correlates them.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod stats;

pub use config::{CountrySet, Indicator, ReportConfig, YearWindow};
pub use error::{JoinAmbiguityError, PipelineError, SchemaError};
pub use report::{run_report, ReportSummary};
