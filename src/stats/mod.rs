//! Stats module - aggregation, correlation and distribution summaries

mod aggregator;
mod calculator;
mod correlation;

pub use aggregator::{
    decade_bucket, AggregateRow, Aggregation, Aggregator, BucketKey, Bucketing,
    MissingDataWarning,
};
pub use calculator::{CountryDistribution, StatsCalculator};
pub use correlation::{pearson, CorrelationCalculator, CorrelationMatrix};
