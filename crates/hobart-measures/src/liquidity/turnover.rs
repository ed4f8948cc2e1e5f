//! Share turnover
//!
//! Trading activity as volume divided by shares outstanding, averaged per
//! stock-month. Higher turnover indicates a more liquid stock. Works on daily
//! data (`min_days` around 15) and on monthly data (`min_days = 1`).

use crate::error::Result;
use crate::measure::Measure;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the turnover measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnoverConfig {
    /// Minimum valid observations per month (default: 15)
    pub min_days: u32,
}

impl Default for TurnoverConfig {
    fn default() -> Self {
        Self { min_days: 15 }
    }
}

/// Monthly mean of volume / shares outstanding
#[derive(Debug, Default)]
pub struct Turnover {
    config: TurnoverConfig,
}

impl Turnover {
    /// Create the measure with `config`.
    pub const fn with_config(config: TurnoverConfig) -> Self {
        Self { config }
    }
}

impl Measure for Turnover {
    fn name(&self) -> &str {
        "turnover"
    }

    fn required_columns(&self) -> &[&str] {
        &["symbol", "date", "volume", "shares_outstanding"]
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let result = data
            .filter(
                col("volume")
                    .is_not_null()
                    .and(col("shares_outstanding").gt(lit(0.0))),
            )
            .with_columns([
                (col("volume") / col("shares_outstanding")).alias("daily_turnover"),
                col("date").dt().year().alias("year"),
                col("date").dt().month().alias("month"),
            ])
            .group_by([col("symbol"), col("year"), col("month")])
            .agg([
                col("date").max().alias("date"),
                col("daily_turnover").mean().alias("turnover"),
                col("daily_turnover").count().alias("n_days"),
            ])
            .filter(col("n_days").gt_eq(lit(self.config.min_days)))
            .sort(["symbol", "date"], Default::default())
            .select([col("symbol"), col("date"), col("turnover"), col("n_days")]);

        Ok(result)
    }
}
