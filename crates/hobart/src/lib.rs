#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod jobs;

// Re-export main types from sub-crates
pub use hobart_data as data;
pub use hobart_measures as measures;
pub use hobart_output as output;
pub use hobart_portfolio as portfolio;
pub use hobart_stats as stats;

pub use config::{JobConfig, LiquidityJobConfig, LiquidityMeasure};
pub use error::{JobError, Result};
pub use jobs::{
    BetaJobOutput, ConsensusJobOutput, DailyPanel, LiquidityInputs, LiquidityJobOutput,
    MeasureSource, run_alpha_job, run_beta_job, run_beta_job_with_progress, run_consensus_job,
    run_liquidity_job, run_liquidity_job_with_progress,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
