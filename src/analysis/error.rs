//! Error types for the analysis core.

use thiserror::Error;

/// Invalid call parameters. Raised before any aggregation runs and never
/// retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A ranking weight is below zero.
    #[error("weight '{name}' must not be negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    /// A ranking weight is NaN or infinite.
    #[error("weight '{name}' must be finite, got {value}")]
    NonFiniteWeight { name: &'static str, value: f64 },

    /// The ranking weights do not add up to one.
    #[error("weights must sum to 1, got {sum}")]
    WeightSum { sum: f64 },

    /// `aggregate` was called without any grouping dimension.
    #[error("at least one grouping dimension is required")]
    EmptyGrouping,

    /// `compare_jobs` was called without any metric.
    #[error("at least one comparison metric is required")]
    EmptyMetricSet,
}
