#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod io;
pub mod panel;
pub mod period;
pub mod records;

pub use error::{DataError, Result};
pub use io::{read_frame, read_records, require_columns};
pub use panel::{
    MergedObs, filter_dates, group_by_entity, is_sorted_panel, lag_by_entity, merge_market,
    sort_panel,
};
pub use period::{Frequency, YearMonth};
pub use records::{
    AnalystEstimate, FactorObs, MarketObs, MeasureValue, PortfolioObs, StockObs,
};

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
