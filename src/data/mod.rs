//! Data module - CSV loading, selection, reshaping and joining

mod loader;
mod merger;
mod reshaper;
mod selector;
mod table;

pub use loader::{DataLoader, LoaderError};
pub use merger::Merger;
pub use reshaper::Reshaper;
pub use selector::Selector;
pub use table::{
    parse_year_label, LongRecord, MergedRecord, WideRow, WideTable, YearColumn, YearSchema,
};
