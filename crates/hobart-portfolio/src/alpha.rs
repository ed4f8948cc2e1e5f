//! Factor-model alphas.
//!
//! Each portfolio's monthly excess return is regressed on the factors of a
//! model; the intercept is the alpha. The spread portfolio is already a
//! zero-investment return and enters without subtracting the risk-free rate.

use crate::error::{PortfolioError, Result};
use crate::formation::SPREAD_LABEL;
use hobart_data::{FactorObs, PortfolioObs, YearMonth};
use hobart_stats::{NeweyWestEstimator, ols};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Factor model used for alpha regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorModel {
    /// Market excess return only
    #[default]
    Capm,
    /// Market, size and value
    #[serde(alias = "ff3")]
    FamaFrench3,
    /// Market, size, value and momentum
    #[serde(alias = "ff4")]
    Carhart4,
    /// Market, size, value and aggregate liquidity
    Liquidity,
}

impl FactorModel {
    /// Factor names in regression order.
    pub const fn factor_names(&self) -> &'static [&'static str] {
        match self {
            Self::Capm => &["mkt_rf"],
            Self::FamaFrench3 => &["mkt_rf", "smb", "hml"],
            Self::Carhart4 => &["mkt_rf", "smb", "hml", "umd"],
            Self::Liquidity => &["mkt_rf", "smb", "hml", "liq"],
        }
    }

    /// Factor values of one month, `None` if any is missing.
    pub fn factor_values(&self, obs: &FactorObs) -> Option<Vec<f64>> {
        self.factor_names()
            .iter()
            .map(|name| factor_value(obs, name))
            .collect()
    }
}

fn factor_value(obs: &FactorObs, name: &str) -> Option<f64> {
    match name {
        "mkt_rf" => Some(obs.mkt_rf),
        "smb" => obs.smb,
        "hml" => obs.hml,
        "umd" => obs.umd,
        "liq" => obs.liq,
        _ => None,
    }
}

impl fmt::Display for FactorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capm => write!(f, "capm"),
            Self::FamaFrench3 => write!(f, "famafrench3"),
            Self::Carhart4 => write!(f, "carhart4"),
            Self::Liquidity => write!(f, "liquidity"),
        }
    }
}

impl FromStr for FactorModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "capm" => Ok(Self::Capm),
            "famafrench3" | "ff3" => Ok(Self::FamaFrench3),
            "carhart4" | "carhart" | "ff4" => Ok(Self::Carhart4),
            "liquidity" | "ps" => Ok(Self::Liquidity),
            other => Err(format!("unknown factor model: {other}")),
        }
    }
}

/// Configuration for alpha regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    /// Factor model (default: CAPM)
    pub model: FactorModel,
    /// Use Newey-West t-statistics (default: true)
    pub newey_west: bool,
    /// Newey-West lags (None = automatic)
    pub nw_lags: Option<usize>,
    /// Minimum months per regression (default: 12)
    pub min_months: usize,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            model: FactorModel::Capm,
            newey_west: true,
            nw_lags: None,
            min_months: 12,
        }
    }
}

/// Alpha regression result for one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaRow {
    /// Portfolio label
    pub portfolio: String,
    /// Factor model
    pub model: FactorModel,
    /// Mean (excess) return
    pub mean_ret: f64,
    /// Intercept
    pub alpha: f64,
    /// t-statistic of the intercept
    pub alpha_t: f64,
    /// Market loading
    pub beta_mkt: f64,
    /// t-statistic of the market loading
    pub t_mkt: f64,
    /// Size loading
    pub beta_smb: Option<f64>,
    /// t-statistic of the size loading
    pub t_smb: Option<f64>,
    /// Value loading
    pub beta_hml: Option<f64>,
    /// t-statistic of the value loading
    pub t_hml: Option<f64>,
    /// Momentum loading
    pub beta_umd: Option<f64>,
    /// t-statistic of the momentum loading
    pub t_umd: Option<f64>,
    /// Liquidity loading
    pub beta_liq: Option<f64>,
    /// t-statistic of the liquidity loading
    pub t_liq: Option<f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Months in the regression
    pub n_months: usize,
}

/// Estimate alphas for every portfolio in `returns`.
///
/// Portfolios are reported in order of first appearance. Months without a
/// complete factor observation are dropped; portfolios with fewer than
/// `min_months` usable months are skipped.
pub fn estimate_alphas(
    returns: &[PortfolioObs],
    factors: &[FactorObs],
    config: &AlphaConfig,
) -> Result<Vec<AlphaRow>> {
    let model = config.model;
    let names = model.factor_names();

    let by_month: HashMap<YearMonth, &FactorObs> = factors
        .iter()
        .map(|f| (YearMonth::from_date(f.date), f))
        .collect();
    if let Some(first) = factors.first() {
        for name in names {
            if factors.iter().all(|f| factor_value(f, name).is_none()) {
                return Err(PortfolioError::MissingFactor {
                    factor: (*name).to_string(),
                    date: first.date,
                });
            }
        }
    } else {
        return Err(PortfolioError::InsufficientData(
            "no factor returns".to_string(),
        ));
    }

    let mut order: Vec<&str> = Vec::new();
    let mut series: HashMap<&str, Vec<&PortfolioObs>> = HashMap::new();
    for r in returns {
        let entry = series.entry(r.portfolio.as_str()).or_default();
        if entry.is_empty() {
            order.push(r.portfolio.as_str());
        }
        entry.push(r);
    }

    let estimator = NeweyWestEstimator::new(hobart_stats::NeweyWestConfig {
        lags: config.nw_lags,
        ..Default::default()
    });
    let min_months = config.min_months.max(names.len() + 2);

    let mut out = Vec::with_capacity(order.len());
    for label in order {
        let mut rows = series.get(label).cloned().unwrap_or_default();
        rows.sort_by_key(|r| r.date);

        let mut y = Vec::with_capacity(rows.len());
        let mut x = Vec::with_capacity(rows.len() * names.len());
        for r in rows {
            let Some(f) = by_month.get(&YearMonth::from_date(r.date)) else {
                continue;
            };
            let Some(values) = model.factor_values(f) else {
                continue;
            };
            let excess = if label == SPREAD_LABEL { r.ret } else { r.ret - f.rf };
            y.push(excess);
            x.extend(values);
        }

        let n = y.len();
        if n < min_months {
            warn!(portfolio = label, months = n, required = min_months, "too few months for alpha regression");
            continue;
        }

        let y = Array1::from(y);
        let x = Array2::from_shape_vec((n, names.len()), x)
            .map_err(|e| PortfolioError::InvalidConfig(format!("factor matrix shape: {e}")))?;
        let fit = ols(&y, &x, true)?;
        let t_stats = if config.newey_west {
            fit.newey_west_t_stats(&estimator)?
        } else {
            fit.t_stats.clone()
        };

        let loading = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .map(|i| (fit.coefficients[i + 1], t_stats[i + 1]))
        };
        let (beta_smb, t_smb) = loading("smb").unzip();
        let (beta_hml, t_hml) = loading("hml").unzip();
        let (beta_umd, t_umd) = loading("umd").unzip();
        let (beta_liq, t_liq) = loading("liq").unzip();

        out.push(AlphaRow {
            portfolio: label.to_string(),
            model,
            mean_ret: y.mean().unwrap_or(f64::NAN),
            alpha: fit.coefficients[0],
            alpha_t: t_stats[0],
            beta_mkt: fit.coefficients[1],
            t_mkt: t_stats[1],
            beta_smb,
            t_smb,
            beta_hml,
            t_hml,
            beta_umd,
            t_umd,
            beta_liq,
            t_liq,
            r_squared: fit.r_squared,
            n_months: n,
        });
    }

    if out.is_empty() {
        return Err(PortfolioError::InsufficientData(format!(
            "no portfolio had {min_months} months matched to factor returns"
        )));
    }

    info!(
        portfolios = out.len(),
        model = %model,
        newey_west = config.newey_west,
        "alpha estimation complete"
    );
    Ok(out)
}
