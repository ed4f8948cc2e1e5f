//! Amihud illiquidity
//!
//! Price impact per dollar traded, averaged over the days of each month:
//!
//! ```text
//! ILLIQ_{i,m} = scale * mean_d( |r_{i,d}| / (|p_{i,d}| * vol_{i,d}) )
//! ```
//!
//! Higher values mean a less liquid stock. Stock-months with fewer than
//! `min_days` valid trading days are dropped.

use crate::error::Result;
use crate::measure::Measure;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the Amihud measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmihudConfig {
    /// Minimum valid trading days per month (default: 15)
    pub min_days: u32,
    /// Scale factor for readability (default: 1e6)
    pub scale: f64,
}

impl Default for AmihudConfig {
    fn default() -> Self {
        Self {
            min_days: 15,
            scale: 1_000_000.0,
        }
    }
}

/// Monthly Amihud illiquidity from daily returns, prices and volume
#[derive(Debug, Default)]
pub struct AmihudIlliquidity {
    config: AmihudConfig,
}

impl AmihudIlliquidity {
    /// Create the measure with `config`.
    pub const fn with_config(config: AmihudConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &AmihudConfig {
        &self.config
    }
}

impl Measure for AmihudIlliquidity {
    fn name(&self) -> &str {
        "amihud"
    }

    fn required_columns(&self) -> &[&str] {
        &["symbol", "date", "returns", "price", "volume"]
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let scale = self.config.scale;

        let result = data
            .filter(
                col("returns")
                    .is_not_null()
                    .and(col("price").is_not_null())
                    .and(col("price").neq(lit(0.0)))
                    .and(col("volume").gt(lit(0.0))),
            )
            .with_columns([
                // Negative prices are bid/ask midpoints
                when(col("price").lt(lit(0.0)))
                    .then(-col("price"))
                    .otherwise(col("price"))
                    .alias("abs_price"),
                when(col("returns").lt(lit(0.0)))
                    .then(-col("returns"))
                    .otherwise(col("returns"))
                    .alias("abs_return"),
                col("date").dt().year().alias("year"),
                col("date").dt().month().alias("month"),
            ])
            .with_columns([(col("abs_return") / (col("abs_price") * col("volume"))
                * lit(scale))
            .alias("daily_illiquidity")])
            .group_by([col("symbol"), col("year"), col("month")])
            .agg([
                col("date").max().alias("date"),
                col("daily_illiquidity").mean().alias("amihud"),
                col("daily_illiquidity").count().alias("n_days"),
            ])
            .filter(col("n_days").gt_eq(lit(self.config.min_days)))
            .sort(["symbol", "date"], Default::default())
            .select([col("symbol"), col("date"), col("amihud"), col("n_days")]);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use hobart_data::frame::{column_date, column_f64};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_frame() -> DataFrame {
        df!(
            "symbol" => ["A", "A", "A", "B", "B", "A"],
            "date" => [
                date(2020, 1, 2),
                date(2020, 1, 3),
                date(2020, 1, 6),
                date(2020, 1, 2),
                date(2020, 1, 3),
                date(2020, 2, 3),
            ],
            "returns" => [0.01, -0.02, 0.0, 0.05, -0.05, 0.03],
            "price" => [10.0, -10.0, 10.0, 5.0, 5.0, 10.0],
            "volume" => [1_000.0, 1_000.0, 1_000.0, 100.0, 100.0, 1_000.0],
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_average_of_daily_ratio() {
        let measure = AmihudIlliquidity::with_config(AmihudConfig {
            min_days: 2,
            scale: 1_000_000.0,
        });
        let out = measure
            .compute_checked(daily_frame().lazy())
            .unwrap()
            .collect()
            .unwrap();

        // A/Jan and B/Jan qualify; A/Feb has one day
        assert_eq!(out.height(), 2);
        let values = column_f64(&out, "amihud").unwrap();
        // A: mean(0.01, 0.02, 0) / 10_000 * 1e6 = 1
        assert_relative_eq!(values[0].unwrap(), 1.0, epsilon = 1e-9);
        // B: 0.05 / 500 * 1e6 = 100
        assert_relative_eq!(values[1].unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_month_end_date_is_last_trading_day() {
        let measure = AmihudIlliquidity::with_config(AmihudConfig {
            min_days: 1,
            ..Default::default()
        });
        let out = measure.compute(daily_frame().lazy()).unwrap().collect().unwrap();
        assert_eq!(out.height(), 3);
        let dates = column_date(&out, "date").unwrap();
        assert_eq!(dates[0], Some(date(2020, 1, 6)));
        assert_eq!(dates[1], Some(date(2020, 2, 3)));
    }

    #[test]
    fn test_missing_volume_column() {
        let frame = df!(
            "symbol" => ["A"],
            "date" => [date(2020, 1, 2)],
            "returns" => [0.01],
            "price" => [10.0],
        )
        .unwrap();
        let result = AmihudIlliquidity::default().compute_checked(frame.lazy());
        assert!(matches!(
            result,
            Err(crate::MeasureError::MissingColumn { .. })
        ));
    }
}
