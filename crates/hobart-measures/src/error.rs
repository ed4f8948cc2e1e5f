//! Error types for measure computation.

use hobart_data::DataError;
use hobart_stats::StatsError;
use thiserror::Error;

/// Errors raised while computing a measure
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Input is missing a column the measure needs
    #[error("Missing required column for {measure}: {column}")]
    MissingColumn {
        /// Measure name
        measure: String,
        /// Column name
        column: String,
    },

    /// Configuration is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Panel is not sorted by entity and date
    #[error("Panel must be sorted by entity and date: {0}")]
    Unsorted(String),

    /// Input had no usable rows
    #[error("No usable observations: {0}")]
    Empty(String),

    /// Data loading or reshaping error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Estimation error
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type for measure computation
pub type Result<T> = std::result::Result<T, MeasureError>;
