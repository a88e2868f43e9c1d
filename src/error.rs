//! Pipeline Error Types
//! Malformed input fails fast; missing data is never an error.

use crate::charts::RenderError;
use crate::config::{ConfigError, Indicator};
use crate::data::LoaderError;
use thiserror::Error;

/// A table is missing its country column, or a year label does not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Schema error in {table}, column `{column}`: {reason}")]
pub struct SchemaError {
    pub table: String,
    pub column: String,
    pub reason: String,
}

impl SchemaError {
    pub fn new(table: impl Into<String>, column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Two records share a (country, year) key for the same indicator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate {indicator} record for ({country}, {year})")]
pub struct JoinAmbiguityError {
    pub indicator: Indicator,
    pub country: String,
    pub year: i32,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    JoinAmbiguity(#[from] JoinAmbiguityError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
