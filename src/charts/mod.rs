//! Charts module - Chart rendering and table output

mod plotter;
pub mod tables;

pub use plotter::{Presenter, SvgPresenter};

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },
    #[error("Failed to write {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("Failed to build table {}: {error}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        error: PolarsError,
    },
    #[error("Failed to write JSON {}: {error}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },
}
