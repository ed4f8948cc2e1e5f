#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

pub mod descriptive;
pub mod error;
pub mod linalg;
pub mod newey_west;
pub mod ols;
pub mod rank;
pub mod rolling;

pub use descriptive::{Describe, mean, median, percentile, std_dev};
pub use error::StatsError;
pub use newey_west::{NeweyWestConfig, NeweyWestEstimator};
pub use ols::{OlsFit, SimpleFit, ols, simple_ols};
pub use rank::{BucketMethod, assign_buckets, breakpoints};
pub use rolling::{RollingConfig, RollingRegression};

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
