//! Portfolio formation.
//!
//! At each formation month `t` the stocks with a measure value are ranked
//! into `groups` buckets. Each bucket is held over months `t+1 ..= t+h`.
//! With `h > 1` the portfolio return of month `s` averages the `h`
//! overlapping cohorts formed at `s-1 ..= s-h` (Jegadeesh-Titman), using the
//! cohorts that exist.

use crate::error::{PortfolioError, Result};
use chrono::NaiveDate;
use hobart_data::{MeasureValue, PortfolioObs, StockObs, YearMonth};
use hobart_stats::{BucketMethod, assign_buckets};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Label of the high-minus-low spread portfolio.
pub const SPREAD_LABEL: &str = "H-L";

/// Portfolio weighting scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Every stock gets the same weight
    #[default]
    Equal,
    /// Weights proportional to market capitalization at formation
    Value,
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Value => write!(f, "value"),
        }
    }
}

impl FromStr for Weighting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equal" | "ew" => Ok(Self::Equal),
            "value" | "vw" => Ok(Self::Value),
            other => Err(format!("unknown weighting: {other}")),
        }
    }
}

/// Configuration for portfolio formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Number of groups (default: 10)
    pub groups: usize,
    /// Weighting scheme (default: equal)
    pub weighting: Weighting,
    /// Minimum ranked stocks for a formation month (default: 10)
    pub min_stocks: usize,
    /// Holding period in months (default: 1)
    pub holding_months: usize,
    /// Bucketing method (default: rank)
    pub method: BucketMethod,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            groups: 10,
            weighting: Weighting::Equal,
            min_stocks: 10,
            holding_months: 1,
            method: BucketMethod::Rank,
        }
    }
}

impl PortfolioConfig {
    fn validate(&self) -> Result<()> {
        if self.groups < 2 {
            return Err(PortfolioError::InvalidConfig(format!(
                "need at least two groups, got {}",
                self.groups
            )));
        }
        if self.holding_months == 0 {
            return Err(PortfolioError::InvalidConfig(
                "holding period must be at least one month".to_string(),
            ));
        }
        Ok(())
    }
}

/// One month's return of one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturn {
    /// Month-end date of the holding month
    pub date: NaiveDate,
    /// Portfolio label: `"1"` (lowest measure) .. `"n"`, or `"H-L"`
    pub portfolio: String,
    /// Portfolio return
    pub ret: f64,
    /// Stocks held (averaged over cohorts)
    pub n_stocks: usize,
}

impl PortfolioReturn {
    /// Convert to a plain portfolio observation.
    pub fn to_obs(&self) -> PortfolioObs {
        PortfolioObs {
            date: self.date,
            portfolio: self.portfolio.clone(),
            ret: self.ret,
        }
    }
}

/// Label of the zero-based bucket `bucket`.
pub fn portfolio_label(bucket: usize) -> String {
    (bucket + 1).to_string()
}

/// A formed portfolio: members and their formation weights.
struct Cohort<'a> {
    bucket: usize,
    members: Vec<(&'a str, f64)>,
}

/// Form sorted portfolios and compute their monthly returns.
///
/// `stocks` supplies returns and market capitalization per stock-month,
/// `measures` the ranking variable. Both are matched by calendar month.
/// Returns are ordered by month, then portfolio, with the spread last.
pub fn form_portfolios(
    stocks: &[StockObs],
    measures: &[MeasureValue],
    config: &PortfolioConfig,
) -> Result<Vec<PortfolioReturn>> {
    config.validate()?;
    if measures.is_empty() {
        return Err(PortfolioError::InsufficientData(
            "no measure values to rank".to_string(),
        ));
    }

    let mut panel: HashMap<(&str, YearMonth), &StockObs> = HashMap::with_capacity(stocks.len());
    for s in stocks {
        panel.insert((s.permno.as_str(), YearMonth::from_date(s.date)), s);
    }

    // Latest value per stock within each formation month
    let mut by_month: BTreeMap<YearMonth, BTreeMap<&str, f64>> = BTreeMap::new();
    let mut sorted_measures: Vec<&MeasureValue> = measures.iter().collect();
    sorted_measures.sort_by_key(|m| m.date);
    for m in sorted_measures {
        if m.value.is_finite() {
            by_month
                .entry(YearMonth::from_date(m.date))
                .or_default()
                .insert(m.permno.as_str(), m.value);
        }
    }

    // (holding month, bucket) -> per-cohort (return, stock count)
    let mut held: BTreeMap<(YearMonth, usize), Vec<(f64, usize)>> = BTreeMap::new();
    let mut formed = 0usize;
    let mut skipped = 0usize;

    for (&month, values) in &by_month {
        let eligible: Vec<(&str, f64, f64)> = values
            .iter()
            .filter_map(|(&permno, &value)| {
                let weight = match config.weighting {
                    Weighting::Equal => 1.0,
                    Weighting::Value => panel.get(&(permno, month))?.market_cap()?,
                };
                Some((permno, value, weight))
            })
            .collect();

        if eligible.len() < config.min_stocks.max(config.groups) {
            skipped += 1;
            debug!(month = %month, stocks = eligible.len(), "too few stocks to form portfolios");
            continue;
        }

        let ranks: Vec<Option<f64>> = eligible.iter().map(|e| Some(e.1)).collect();
        let buckets = assign_buckets(&ranks, config.groups, config.method)?;

        let mut cohorts: Vec<Cohort<'_>> = (0..config.groups)
            .map(|bucket| Cohort {
                bucket,
                members: Vec::new(),
            })
            .collect();
        for (e, bucket) in eligible.iter().zip(buckets) {
            if let Some(b) = bucket {
                cohorts[b].members.push((e.0, e.2));
            }
        }
        formed += 1;

        for k in 1..=config.holding_months {
            let hold = month.offset(k as i64);
            for cohort in &cohorts {
                if let Some(r) = cohort_return(cohort, hold, &panel) {
                    held.entry((hold, cohort.bucket)).or_default().push(r);
                }
            }
        }
    }

    if formed == 0 {
        return Err(PortfolioError::InsufficientData(format!(
            "no month had at least {} ranked stocks",
            config.min_stocks.max(config.groups)
        )));
    }

    let mut out = Vec::new();
    let mut monthly: BTreeMap<YearMonth, BTreeMap<usize, (f64, usize)>> = BTreeMap::new();
    for ((month, bucket), cohorts) in held {
        let n = cohorts.len() as f64;
        let ret = cohorts.iter().map(|c| c.0).sum::<f64>() / n;
        let stocks = (cohorts.iter().map(|c| c.1).sum::<usize>() as f64 / n).round() as usize;
        monthly.entry(month).or_default().insert(bucket, (ret, stocks));
    }

    let top = config.groups - 1;
    for (month, buckets) in monthly {
        let date = month.last_day();
        for (&bucket, &(ret, n_stocks)) in &buckets {
            out.push(PortfolioReturn {
                date,
                portfolio: portfolio_label(bucket),
                ret,
                n_stocks,
            });
        }
        if let (Some(high), Some(low)) = (buckets.get(&top), buckets.get(&0)) {
            out.push(PortfolioReturn {
                date,
                portfolio: SPREAD_LABEL.to_string(),
                ret: high.0 - low.0,
                n_stocks: high.1 + low.1,
            });
        }
    }

    info!(
        formation_months = formed,
        skipped,
        rows = out.len(),
        groups = config.groups,
        weighting = %config.weighting,
        holding_months = config.holding_months,
        "portfolio formation complete"
    );
    Ok(out)
}

/// Weighted return of a cohort in month `hold`, over members with a return.
fn cohort_return(
    cohort: &Cohort<'_>,
    hold: YearMonth,
    panel: &HashMap<(&str, YearMonth), &StockObs>,
) -> Option<(f64, usize)> {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut count = 0;
    for &(permno, weight) in &cohort.members {
        if let Some(ret) = panel
            .get(&(permno, hold))
            .and_then(|s| s.ret)
            .filter(|r| r.is_finite())
        {
            weighted += weight * ret;
            total_weight += weight;
            count += 1;
        }
    }
    (count > 0 && total_weight > 0.0).then(|| (weighted / total_weight, count))
}
