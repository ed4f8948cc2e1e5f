//! Job configuration.
//!
//! Every section falls back to its component defaults, so a configuration
//! file only needs the values it changes:
//!
//! ```json
//! {
//!   "start": "1990-01-01",
//!   "beta": { "window": 36, "min_periods": 24 },
//!   "portfolio": { "groups": 5, "weighting": "value" },
//!   "alpha": { "model": "carhart4", "nw_lags": 6 }
//! }
//! ```

use crate::error::{JobError, Result};
use chrono::NaiveDate;
use hobart_measures::{AmihudConfig, BetaConfig, ConsensusConfig, LiquidityBetaConfig, TurnoverConfig};
use hobart_output::ExportFormat;
use hobart_portfolio::{AlphaConfig, PortfolioConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Measure used to sort stocks in the liquidity job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityMeasure {
    /// Loading on aggregate liquidity innovations
    #[default]
    LiquidityBeta,
    /// Amihud illiquidity
    Amihud,
    /// Share turnover
    Turnover,
}

impl fmt::Display for LiquidityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiquidityBeta => write!(f, "liquidity_beta"),
            Self::Amihud => write!(f, "amihud"),
            Self::Turnover => write!(f, "turnover"),
        }
    }
}

impl FromStr for LiquidityMeasure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "liquidity_beta" | "liq_beta" => Ok(Self::LiquidityBeta),
            "amihud" | "illiq" => Ok(Self::Amihud),
            "turnover" => Ok(Self::Turnover),
            other => Err(format!("unknown liquidity measure: {other}")),
        }
    }
}

/// Settings of the liquidity job's ranking measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityJobConfig {
    /// Measure to rank on (default: liquidity beta)
    pub measure: LiquidityMeasure,
    /// Amihud settings
    pub amihud: AmihudConfig,
    /// Turnover settings
    pub turnover: TurnoverConfig,
    /// Liquidity beta settings
    pub liquidity_beta: LiquidityBetaConfig,
    /// Report measures as monthly cross-sectional z-scores (default: false)
    pub standardize: bool,
}

/// Configuration shared by all jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// First date kept from the inputs
    pub start: Option<NaiveDate>,
    /// Last date kept from the inputs
    pub end: Option<NaiveDate>,
    /// Rolling beta settings
    pub beta: BetaConfig,
    /// Analyst consensus settings
    pub consensus: ConsensusConfig,
    /// Liquidity measure settings
    pub liquidity: LiquidityJobConfig,
    /// Portfolio formation settings
    pub portfolio: PortfolioConfig,
    /// Alpha regression settings
    pub alpha: AlphaConfig,
    /// Output format (default: csv)
    pub format: ExportFormat,
}

impl JobConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(JobError::Config(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Date range to keep, open ends replaced by the extreme dates.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (
            self.start.unwrap_or(NaiveDate::MIN),
            self.end.unwrap_or(NaiveDate::MAX),
        )
    }
}
