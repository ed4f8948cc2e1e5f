//! Error types for portfolio construction and alpha estimation.

use hobart_stats::StatsError;
use thiserror::Error;

/// Errors that can occur while forming portfolios or estimating alphas
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Configuration is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not enough data to form a single portfolio or regression
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A factor required by the model is missing from the factor file
    #[error("Factor {factor} missing for {date}")]
    MissingFactor {
        /// Factor name
        factor: String,
        /// Period lacking the factor
        date: chrono::NaiveDate,
    },

    /// Estimation error
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),
}

/// Result type for portfolio operations
pub type Result<T> = std::result::Result<T, PortfolioError>;
