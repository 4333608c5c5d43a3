pub mod aggregation;
pub mod normalization;

pub use aggregation::{Accumulator, AggregationReport, aggregate, aggregate_with_report};
pub use normalization::{normalize, normalize_record};
