//! Rolling market beta.
//!
//! For each stock the return is regressed on the market return over a
//! trailing window of `window` periods:
//!
//! ```text
//! r_{i,t} = a_i + b_i * m_t + e_{i,t}
//! ```
//!
//! The slope `b_i` is the stock's beta and the residual standard deviation
//! is its idiosyncratic volatility. With `excess = true` both sides are taken
//! in excess of the risk-free rate.

use crate::error::{MeasureError, Result};
use chrono::NaiveDate;
use hobart_data::{Frequency, MergedObs};
use hobart_stats::{RollingConfig, RollingRegression};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for rolling beta estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetaConfig {
    /// Window length in periods (default: 60)
    pub window: usize,
    /// Minimum observations in the window (default: 24)
    pub min_periods: usize,
    /// Period frequency of the panel (default: monthly)
    pub frequency: Frequency,
    /// Regress excess rather than raw returns (default: false)
    pub excess: bool,
}

impl Default for BetaConfig {
    fn default() -> Self {
        Self {
            window: 60,
            min_periods: 24,
            frequency: Frequency::Monthly,
            excess: false,
        }
    }
}

impl BetaConfig {
    fn rolling(&self) -> RollingConfig {
        RollingConfig {
            window: self.window,
            min_periods: self.min_periods,
        }
    }
}

/// Beta estimate for one stock-period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaEstimate {
    /// Security identifier
    pub permno: String,
    /// Last date of the estimation window
    pub date: NaiveDate,
    /// Slope on the market return
    pub beta: f64,
    /// Intercept
    pub alpha: f64,
    /// Residual standard deviation
    pub resid_std: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Observations in the window
    pub n_obs: usize,
}

/// Trailing-window beta estimator
#[derive(Debug, Clone)]
pub struct RollingBeta {
    config: BetaConfig,
    regression: RollingRegression,
}

impl RollingBeta {
    /// Create an estimator, validating the window settings.
    pub fn new(config: BetaConfig) -> Result<Self> {
        let regression = RollingRegression::new(config.rolling())?;
        Ok(Self { config, regression })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &BetaConfig {
        &self.config
    }

    /// Estimate betas for a single stock's history (sorted by date).
    pub fn estimate_entity(&self, rows: &[MergedObs]) -> Result<Vec<BetaEstimate>> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        if rows.iter().any(|r| r.permno != first.permno) {
            return Err(MeasureError::Unsorted(format!(
                "rows for more than one entity passed as {}",
                first.permno
            )));
        }

        let periods: Vec<i64> = rows.iter().map(|r| r.period).collect();
        let (y, x): (Vec<f64>, Vec<f64>) = if self.config.excess {
            rows.iter()
                .map(|r| (r.excess_ret(), r.excess_market()))
                .unzip()
        } else {
            rows.iter().map(|r| (r.ret, r.market_return)).unzip()
        };

        let fits = self.regression.simple(&periods, &y, &x)?;
        let estimates = rows
            .iter()
            .zip(fits)
            .filter_map(|(row, fit)| {
                fit.map(|f| BetaEstimate {
                    permno: row.permno.clone(),
                    date: row.date,
                    beta: f.beta,
                    alpha: f.alpha,
                    resid_std: f.resid_std,
                    r_squared: f.r_squared,
                    n_obs: f.n_obs,
                })
            })
            .collect();
        Ok(estimates)
    }

    /// Estimate betas for every stock in a merged panel sorted by entity and
    /// date.
    pub fn estimate(&self, rows: &[MergedObs]) -> Result<Vec<BetaEstimate>> {
        self.estimate_with_progress(rows, |_, _| {})
    }

    /// Like [`RollingBeta::estimate`], calling `on_entity(done, total)` after
    /// each stock.
    pub fn estimate_with_progress<F>(
        &self,
        rows: &[MergedObs],
        mut on_entity: F,
    ) -> Result<Vec<BetaEstimate>>
    where
        F: FnMut(usize, usize),
    {
        check_sorted(rows)?;
        let entities: Vec<&[MergedObs]> = rows.chunk_by(|a, b| a.permno == b.permno).collect();
        let total = entities.len();

        let mut out = Vec::new();
        let mut skipped = 0usize;
        for (i, entity) in entities.into_iter().enumerate() {
            let estimates = self.estimate_entity(entity)?;
            if estimates.is_empty() {
                skipped += 1;
                debug!(
                    permno = %entity[0].permno,
                    rows = entity.len(),
                    "no window reached the minimum observation count"
                );
            }
            out.extend(estimates);
            on_entity(i + 1, total);
        }

        info!(
            stocks = total,
            skipped,
            estimates = out.len(),
            window = self.config.window,
            min_periods = self.config.min_periods,
            "rolling beta estimation complete"
        );
        Ok(out)
    }
}

impl Default for RollingBeta {
    fn default() -> Self {
        Self {
            config: BetaConfig::default(),
            regression: RollingRegression::default(),
        }
    }
}

fn check_sorted(rows: &[MergedObs]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.permno == b.permno {
            if a.date >= b.date {
                return Err(MeasureError::Unsorted(format!(
                    "{} has dates out of order at {}",
                    b.permno, b.date
                )));
            }
        } else {
            seen.insert(a.permno.as_str());
            if seen.contains(b.permno.as_str()) {
                return Err(MeasureError::Unsorted(format!(
                    "{} appears in more than one block",
                    b.permno
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Datelike;
    use hobart_data::YearMonth;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn synthetic_panel(stocks: &[(&str, f64, f64)], months: usize, noise: f64) -> Vec<MergedObs> {
        let mut rng = StdRng::seed_from_u64(2024);
        let start = YearMonth::new(2000, 1).unwrap();
        let market: Vec<f64> = (0..months).map(|_| rng.gen_range(-0.08..0.08)).collect();

        let mut rows = Vec::new();
        for &(permno, a, b) in stocks {
            for (t, &m) in market.iter().enumerate() {
                let e = if noise > 0.0 {
                    rng.gen_range(-noise..noise)
                } else {
                    0.0
                };
                rows.push(MergedObs {
                    permno: permno.to_string(),
                    date: start.offset(t as i64).last_day(),
                    ret: a + b * m + e,
                    market_return: m,
                    risk_free: Some(0.001),
                    period: start.offset(t as i64).index(),
                });
            }
        }
        rows
    }

    #[test]
    fn test_config_defaults() {
        let config = BetaConfig::default();
        assert_eq!(config.window, 60);
        assert_eq!(config.min_periods, 24);
        assert_eq!(config.frequency, Frequency::Monthly);
        assert!(!config.excess);
    }

    #[test]
    fn test_recovers_known_slopes() {
        let rows = synthetic_panel(&[("A", 0.002, 0.5), ("B", -0.001, 1.5)], 96, 0.0);
        let estimates = RollingBeta::default().estimate(&rows).unwrap();

        // 96 - 23 estimates per stock
        assert_eq!(estimates.len(), 2 * 73);
        for est in &estimates {
            let expected = if est.permno == "A" { 0.5 } else { 1.5 };
            assert_relative_eq!(est.beta, expected, epsilon = 1e-9);
            assert!(est.resid_std < 1e-9);
        }
    }

    #[test]
    fn test_noisy_slope_is_close() {
        let rows = synthetic_panel(&[("A", 0.0, 1.2)], 120, 0.01);
        let estimates = RollingBeta::default().estimate(&rows).unwrap();
        let last = estimates.last().unwrap();
        assert_eq!(last.n_obs, 60);
        assert_relative_eq!(last.beta, 1.2, epsilon = 0.15);
        assert!(last.resid_std > 0.0);
    }

    #[test]
    fn test_excess_returns_shift_alpha_only() {
        let rows = synthetic_panel(&[("A", 0.002, 0.8)], 40, 0.0);
        let raw = RollingBeta::default().estimate(&rows).unwrap();
        let excess = RollingBeta::new(BetaConfig {
            excess: true,
            ..Default::default()
        })
        .unwrap()
        .estimate(&rows)
        .unwrap();

        let (r, e) = (raw.last().unwrap(), excess.last().unwrap());
        assert_relative_eq!(r.beta, e.beta, epsilon = 1e-9);
        // a - rf + b * rf
        assert_relative_eq!(e.alpha, 0.002 - 0.001 + 0.8 * 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_window_counts_periods_not_dates() {
        // Weekday dates with weekend gaps, indexed by trading-day position
        let mut rng = StdRng::seed_from_u64(5);
        let mut day = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        let mut rows = Vec::new();
        for t in 0..100 {
            let m: f64 = rng.gen_range(-0.02..0.02);
            rows.push(MergedObs {
                permno: "A".to_string(),
                date: day,
                ret: 0.9 * m,
                market_return: m,
                risk_free: None,
                period: t,
            });
            day = day.succ_opt().unwrap();
            while day.weekday().number_from_monday() > 5 {
                day = day.succ_opt().unwrap();
            }
        }

        let estimates = RollingBeta::new(BetaConfig {
            window: 60,
            min_periods: 60,
            frequency: Frequency::Daily,
            excess: false,
        })
        .unwrap()
        .estimate(&rows)
        .unwrap();
        assert_eq!(estimates.len(), 41);
        assert!(estimates.iter().all(|e| e.n_obs == 60));
    }

    #[test]
    fn test_short_history_is_skipped() {
        let rows = synthetic_panel(&[("A", 0.0, 1.0)], 10, 0.0);
        let estimates = RollingBeta::default().estimate(&rows).unwrap();
        assert!(estimates.is_empty());
    }

    #[test]
    fn test_progress_reports_every_stock() {
        let rows = synthetic_panel(&[("A", 0.0, 1.0), ("B", 0.0, 1.0), ("C", 0.0, 1.0)], 30, 0.0);
        let mut calls = Vec::new();
        RollingBeta::default()
            .estimate_with_progress(&rows, |done, total| calls.push((done, total)))
            .unwrap();
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_interleaved_panel_rejected() {
        let mut rows = synthetic_panel(&[("A", 0.0, 1.0), ("B", 0.0, 1.0)], 3, 0.0);
        rows.swap(2, 3);
        assert!(matches!(
            RollingBeta::default().estimate(&rows),
            Err(MeasureError::Unsorted(_))
        ));
    }
}
