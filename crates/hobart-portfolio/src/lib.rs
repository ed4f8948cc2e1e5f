#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

pub mod alpha;
pub mod error;
pub mod formation;
pub mod summary;

pub use alpha::{AlphaConfig, AlphaRow, FactorModel, estimate_alphas};
pub use error::{PortfolioError, Result};
pub use formation::{
    PortfolioConfig, PortfolioReturn, SPREAD_LABEL, Weighting, form_portfolios, portfolio_label,
};
pub use summary::{DecileSummary, summarize};

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
