//! Run reports.
//!
//! A [`RunReport`] records what a job did: its parameters, how many rows it
//! read and wrote, and where the outputs went.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field was not set on the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Report of one job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Job name (`beta`, `consensus`, `liquidity`, `alpha`).
    pub job: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Crate version that produced the run.
    pub version: String,

    /// Effective job parameters.
    pub parameters: serde_json::Value,

    /// Row counts keyed by dataset name.
    pub row_counts: BTreeMap<String, usize>,

    /// Files written.
    pub outputs: Vec<PathBuf>,
}

impl RunReport {
    /// Create a new report.
    pub fn new(job: String, parameters: serde_json::Value) -> Self {
        Self {
            job,
            timestamp: Utc::now(),
            version: crate::VERSION.to_string(),
            parameters,
            row_counts: BTreeMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating run reports.
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    job: Option<String>,
    parameters: Option<serde_json::Value>,
    row_counts: BTreeMap<String, usize>,
    outputs: Vec<PathBuf>,
}

impl RunReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the job name.
    pub fn job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Set the job parameters from any serializable configuration.
    pub fn parameters<T: Serialize>(mut self, parameters: &T) -> Result<Self, ReportError> {
        self.parameters = Some(serde_json::to_value(parameters)?);
        Ok(self)
    }

    /// Record a row count.
    pub fn rows(mut self, dataset: impl Into<String>, count: usize) -> Self {
        self.row_counts.insert(dataset.into(), count);
        self
    }

    /// Record an output file.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<RunReport, ReportError> {
        let job = self.job.ok_or(ReportError::MissingField("job"))?;
        let mut report = RunReport::new(
            job,
            self.parameters.unwrap_or(serde_json::Value::Null),
        );
        report.row_counts = self.row_counts;
        report.outputs = self.outputs;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Params {
        window: usize,
    }

    #[test]
    fn test_report_creation() {
        let report = RunReport::new("beta".to_string(), serde_json::json!({"window": 60}));
        assert_eq!(report.job, "beta");
        assert_eq!(report.parameters["window"], 60);
        assert!(report.row_counts.is_empty());
    }

    #[test]
    fn test_report_builder() {
        let report = RunReportBuilder::new()
            .job("liquidity")
            .parameters(&Params { window: 36 })
            .unwrap()
            .rows("stocks", 1_200)
            .rows("portfolio_returns", 264)
            .output("out/returns.csv")
            .build()
            .unwrap();

        assert_eq!(report.job, "liquidity");
        assert_eq!(report.parameters["window"], 36);
        assert_eq!(report.row_counts["stocks"], 1_200);
        assert_eq!(report.outputs, vec![PathBuf::from("out/returns.csv")]);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"portfolio_returns\": 264"));
    }

    #[test]
    fn test_builder_requires_job() {
        assert!(matches!(
            RunReportBuilder::new().build(),
            Err(ReportError::MissingField("job"))
        ));
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join("hobart_report_test.json");
        RunReport::new("alpha".to_string(), serde_json::Value::Null)
            .write_to(&path)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"job\": \"alpha\""));
        std::fs::remove_file(path).ok();
    }
}
