#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

pub mod beta;
pub mod consensus;
pub mod error;
pub mod liquidity;
pub mod measure;
pub mod registry;
pub mod standardize;

pub use beta::{BetaConfig, BetaEstimate, RollingBeta};
pub use consensus::{Consensus, ConsensusConfig, ConsensusRow};
pub use error::{MeasureError, Result};
pub use liquidity::{
    AmihudConfig, AmihudIlliquidity, LiquidityBeta, LiquidityBetaConfig, LiquidityBetaEstimate,
    Turnover, TurnoverConfig,
};
pub use measure::{Measure, collect_values};

// Re-export registry types for convenience
pub use registry::{
    MeasureCategory, MeasureInfo, available_measures, get_measure_info, measures_by_category,
};
pub use standardize::standardize_by_month;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
