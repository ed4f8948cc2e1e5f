//! Panel reshaping: sort, group, lag and merge.
//!
//! All entity-wise computations assume the panel is sorted by entity and then
//! by date. [`sort_panel`] establishes that order and the other helpers rely
//! on it.

use crate::error::{DataError, Result};
use crate::period::Frequency;
use crate::records::{MarketObs, StockObs};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Sort a panel by entity, then date.
pub fn sort_panel(obs: &mut [StockObs]) {
    obs.sort_by(|a, b| a.permno.cmp(&b.permno).then(a.date.cmp(&b.date)));
}

/// Whether a panel is sorted by entity, then date.
pub fn is_sorted_panel(obs: &[StockObs]) -> bool {
    obs.windows(2)
        .all(|w| (&w[0].permno, w[0].date) <= (&w[1].permno, w[1].date))
}

/// Split a sorted panel into one contiguous slice per entity.
pub fn group_by_entity(obs: &[StockObs]) -> Vec<&[StockObs]> {
    obs.chunk_by(|a, b| a.permno == b.permno).collect()
}

/// Previous-period value of `f` within each entity.
///
/// The lag is `None` on an entity's first row and wherever the previous row
/// is not the immediately preceding period (a gap in the history). Daily
/// periods are calendar days here, so a weekend also breaks the chain.
pub fn lag_by_entity<F>(obs: &[StockObs], frequency: Frequency, f: F) -> Vec<Option<f64>>
where
    F: Fn(&StockObs) -> Option<f64>,
{
    let mut lagged = Vec::with_capacity(obs.len());
    for (i, row) in obs.iter().enumerate() {
        let value = if i == 0 {
            None
        } else {
            let prev = &obs[i - 1];
            let consecutive = prev.permno == row.permno
                && frequency.period_index(row.date) - frequency.period_index(prev.date) == 1;
            if consecutive { f(prev) } else { None }
        };
        lagged.push(value);
    }
    lagged
}

/// Keep observations dated within `[start, end]`.
pub fn filter_dates(obs: Vec<StockObs>, start: NaiveDate, end: NaiveDate) -> Result<Vec<StockObs>> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(obs
        .into_iter()
        .filter(|o| o.date >= start && o.date <= end)
        .collect())
}

/// A stock-period joined with the market return of the same period.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedObs {
    /// Entity identifier
    pub permno: String,
    /// Observation date (the stock's date)
    pub date: NaiveDate,
    /// Stock return
    pub ret: f64,
    /// Market return of the same period
    pub market_return: f64,
    /// Risk-free rate of the same period
    pub risk_free: Option<f64>,
    /// Window index: the month index for monthly data, the position in the
    /// market's trading calendar for daily data
    pub period: i64,
}

impl MergedObs {
    /// Stock return in excess of the risk-free rate (raw when no rate is known).
    pub fn excess_ret(&self) -> f64 {
        self.ret - self.risk_free.unwrap_or(0.0)
    }

    /// Market return in excess of the risk-free rate.
    pub fn excess_market(&self) -> f64 {
        self.market_return - self.risk_free.unwrap_or(0.0)
    }
}

/// Inner-join stock rows with the market row of the same period.
///
/// Stock rows without a return or without a matching market period are
/// dropped. The output keeps the input order, so a sorted panel stays sorted.
///
/// For daily data the market dates form the trading calendar and
/// [`MergedObs::period`] is a date's position in it, so a window of `n`
/// periods spans `n` trading days.
pub fn merge_market(
    stocks: &[StockObs],
    market: &[MarketObs],
    frequency: Frequency,
) -> Result<Vec<MergedObs>> {
    if market.is_empty() {
        return Err(DataError::EmptyPanel("market returns".to_string()));
    }

    let by_period: HashMap<i64, &MarketObs> = market
        .iter()
        .map(|m| (frequency.period_index(m.date), m))
        .collect();

    let trading_days: HashMap<i64, i64> = match frequency {
        Frequency::Daily => {
            let mut keys: Vec<i64> = by_period.keys().copied().collect();
            keys.sort_unstable();
            keys.into_iter().zip(0..).collect()
        }
        Frequency::Monthly => HashMap::new(),
    };

    let merged: Vec<MergedObs> = stocks
        .iter()
        .filter_map(|s| {
            let ret = s.ret?;
            let key = frequency.period_index(s.date);
            let m = by_period.get(&key)?;
            Some(MergedObs {
                permno: s.permno.clone(),
                date: s.date,
                ret,
                market_return: m.market_return,
                risk_free: m.risk_free,
                period: trading_days.get(&key).copied().unwrap_or(key),
            })
        })
        .collect();

    debug!(
        stocks = stocks.len(),
        merged = merged.len(),
        "merged stock panel with market returns"
    );

    if merged.is_empty() {
        return Err(DataError::EmptyPanel(
            "no stock periods matched a market period".to_string(),
        ));
    }
    Ok(merged)
}
