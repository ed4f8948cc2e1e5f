//! Liquidity beta
//!
//! Exposure of a stock's excess return to innovations in aggregate
//! liquidity, controlling for the market:
//!
//! ```text
//! r_{i,t} - rf_t = a_i + b_i * MKT_t + g_i * LIQ_t + e_{i,t}
//! ```
//!
//! The liquidity-risk measure is `g_i`, re-estimated each month over a
//! trailing window of monthly observations.

use crate::error::{MeasureError, Result};
use chrono::NaiveDate;
use hobart_data::{FactorObs, Frequency, MeasureValue, StockObs, group_by_entity, is_sorted_panel};
use hobart_stats::{RollingConfig, RollingRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Configuration for liquidity beta estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityBetaConfig {
    /// Window length in months (default: 60)
    pub window: usize,
    /// Minimum months in the window (default: 36)
    pub min_periods: usize,
}

impl Default for LiquidityBetaConfig {
    fn default() -> Self {
        Self {
            window: 60,
            min_periods: 36,
        }
    }
}

/// Liquidity beta for one stock-month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityBetaEstimate {
    /// Security identifier
    pub permno: String,
    /// Last month of the estimation window
    pub date: NaiveDate,
    /// Loading on the liquidity factor
    pub liq_beta: f64,
    /// t-statistic of the liquidity loading
    pub liq_beta_t: f64,
    /// Loading on the market excess return
    pub market_beta: f64,
    /// Intercept
    pub alpha: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Months in the window
    pub n_obs: usize,
}

impl LiquidityBetaEstimate {
    /// The liquidity loading as a generic measure value.
    pub fn value(&self) -> MeasureValue {
        MeasureValue::new(self.permno.clone(), self.date, self.liq_beta)
    }
}

/// Rolling two-factor regression on market and liquidity innovations
#[derive(Debug, Clone)]
pub struct LiquidityBeta {
    config: LiquidityBetaConfig,
    regression: RollingRegression,
}

impl LiquidityBeta {
    /// Create an estimator, validating the window settings.
    pub fn new(config: LiquidityBetaConfig) -> Result<Self> {
        let regression = RollingRegression::new(RollingConfig {
            window: config.window,
            min_periods: config.min_periods,
        })?;
        Ok(Self { config, regression })
    }

    /// Estimate liquidity betas for every stock of a monthly panel.
    pub fn estimate(
        &self,
        stocks: &[StockObs],
        factors: &[FactorObs],
    ) -> Result<Vec<LiquidityBetaEstimate>> {
        self.estimate_with_progress(stocks, factors, |_, _| {})
    }

    /// Like [`LiquidityBeta::estimate`], calling `on_entity(done, total)`
    /// after each stock.
    pub fn estimate_with_progress<F>(
        &self,
        stocks: &[StockObs],
        factors: &[FactorObs],
        mut on_entity: F,
    ) -> Result<Vec<LiquidityBetaEstimate>>
    where
        F: FnMut(usize, usize),
    {
        if !is_sorted_panel(stocks) {
            return Err(MeasureError::Unsorted("stock panel".to_string()));
        }

        let frequency = Frequency::Monthly;
        let by_month: HashMap<i64, (f64, f64, f64)> = factors
            .iter()
            .filter_map(|f| {
                f.liq
                    .map(|liq| (frequency.period_index(f.date), (f.mkt_rf, liq, f.rf)))
            })
            .collect();
        if by_month.is_empty() {
            return Err(MeasureError::Empty(
                "factor file has no liquidity factor values".to_string(),
            ));
        }

        let entities = group_by_entity(stocks);
        let total = entities.len();
        let mut out = Vec::new();

        for (i, entity) in entities.into_iter().enumerate() {
            let mut periods = Vec::with_capacity(entity.len());
            let mut dates = Vec::with_capacity(entity.len());
            let mut y = Vec::with_capacity(entity.len());
            let mut x = Vec::with_capacity(entity.len() * 2);

            for obs in entity {
                let period = frequency.period_index(obs.date);
                if let (Some(ret), Some(&(mkt_rf, liq, rf))) = (obs.ret, by_month.get(&period)) {
                    periods.push(period);
                    dates.push(obs.date);
                    y.push(ret - rf);
                    x.extend([mkt_rf, liq]);
                }
            }

            if periods.len() < self.config.min_periods {
                debug!(permno = %entity[0].permno, months = periods.len(), "too few months for liquidity beta");
                on_entity(i + 1, total);
                continue;
            }

            let n = periods.len();
            let y = Array1::from(y);
            let x = Array2::from_shape_vec((n, 2), x).map_err(|e| {
                MeasureError::InvalidConfig(format!("design matrix shape: {e}"))
            })?;
            let fits = self.regression.multiple(&periods, &y, &x)?;

            for (date, fit) in dates.into_iter().zip(fits) {
                if let Some(fit) = fit {
                    out.push(LiquidityBetaEstimate {
                        permno: entity[0].permno.clone(),
                        date,
                        liq_beta: fit.coefficients[2],
                        liq_beta_t: fit.t_stats[2],
                        market_beta: fit.coefficients[1],
                        alpha: fit.coefficients[0],
                        r_squared: fit.r_squared,
                        n_obs: fit.n_obs,
                    });
                }
            }
            on_entity(i + 1, total);
        }

        info!(
            stocks = total,
            estimates = out.len(),
            window = self.config.window,
            "liquidity beta estimation complete"
        );
        Ok(out)
    }
}

impl Default for LiquidityBeta {
    fn default() -> Self {
        Self {
            config: LiquidityBetaConfig::default(),
            regression: RollingRegression::new(RollingConfig {
                window: 60,
                min_periods: 36,
            })
            .unwrap_or_default(),
        }
    }
}
