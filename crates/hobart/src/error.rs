//! Error type of the batch jobs.

use hobart_data::DataError;
use hobart_measures::MeasureError;
use hobart_output::{ExportError, ReportError};
use hobart_portfolio::PortfolioError;
use thiserror::Error;

/// Result type for job operations.
pub type Result<T> = std::result::Result<T, JobError>;

/// Errors raised by a job run
#[derive(Debug, Error)]
pub enum JobError {
    /// Configuration is inconsistent
    #[error("Invalid job configuration: {0}")]
    Config(String),

    /// Input loading or reshaping failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Measure computation failed
    #[error("Measure error: {0}")]
    Measure(#[from] MeasureError),

    /// Portfolio formation or alpha estimation failed
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    /// Writing results failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Writing the run report failed
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
