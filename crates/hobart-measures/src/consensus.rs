//! Analyst consensus
//!
//! Aggregates individual analyst forecasts into monthly consensus
//! statistics. For each ticker and fiscal period, a statistics date is taken
//! at every month end from the first forecast until the actual is announced.
//! On each statistics date every analyst contributes only their most recent
//! forecast, provided it is no older than `max_age_days`.

use crate::error::{MeasureError, Result};
use chrono::NaiveDate;
use hobart_data::{AnalystEstimate, YearMonth};
use hobart_stats::{mean, median, std_dev};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Configuration for consensus aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Oldest forecast still counted, in days (default: 180)
    pub max_age_days: i64,
    /// Minimum analysts for a consensus row (default: 1)
    pub min_analysts: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_age_days: 180,
            min_analysts: 1,
        }
    }
}

/// Consensus statistics for one ticker, fiscal period and statistics date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRow {
    /// Ticker
    pub ticker: String,
    /// Fiscal period end being forecast
    pub fiscal_period_end: NaiveDate,
    /// Month-end statistics date
    pub stat_date: NaiveDate,
    /// Analysts with a live forecast
    pub n_analysts: usize,
    /// Mean forecast
    pub mean: f64,
    /// Median forecast
    pub median: f64,
    /// Sample standard deviation (two or more analysts)
    pub std: Option<f64>,
    /// Lowest forecast
    pub low: f64,
    /// Highest forecast
    pub high: f64,
    /// `std / |mean|`
    pub dispersion: Option<f64>,
    /// Change of the mean since the previous statistics date
    pub revision: Option<f64>,
    /// Reported actual
    pub actual: Option<f64>,
    /// `actual - mean`
    pub surprise: Option<f64>,
}

/// Consensus builder
#[derive(Debug, Clone, Default)]
pub struct Consensus {
    config: ConsensusConfig,
}

impl Consensus {
    /// Create a builder, validating the configuration.
    pub fn new(config: ConsensusConfig) -> Result<Self> {
        if config.max_age_days < 0 {
            return Err(MeasureError::InvalidConfig(
                "max_age_days must be non-negative".to_string(),
            ));
        }
        if config.min_analysts == 0 {
            return Err(MeasureError::InvalidConfig(
                "min_analysts must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Build consensus rows, sorted by ticker, fiscal period and date.
    pub fn compute(&self, estimates: &[AnalystEstimate]) -> Result<Vec<ConsensusRow>> {
        if estimates.is_empty() {
            return Err(MeasureError::Empty("no analyst estimates".to_string()));
        }

        let mut groups: BTreeMap<(&str, NaiveDate), Vec<&AnalystEstimate>> = BTreeMap::new();
        for e in estimates {
            groups
                .entry((e.ticker.as_str(), e.fiscal_period_end))
                .or_default()
                .push(e);
        }

        let mut out = Vec::new();
        for ((ticker, fpe), mut group) in groups {
            // Stable: same-day forecasts keep input order, the later one wins
            group.sort_by_key(|e| e.announce_date);
            let rows = self.compute_group(ticker, fpe, &group);
            if rows.is_empty() {
                debug!(ticker, fiscal_period_end = %fpe, "no consensus dates");
            }
            out.extend(rows);
        }

        info!(
            estimates = estimates.len(),
            rows = out.len(),
            "consensus aggregation complete"
        );
        Ok(out)
    }

    fn compute_group(
        &self,
        ticker: &str,
        fiscal_period_end: NaiveDate,
        group: &[&AnalystEstimate],
    ) -> Vec<ConsensusRow> {
        let Some(first) = group.first() else {
            return Vec::new();
        };
        let actual = group.iter().find_map(|e| e.actual);
        let actual_date = group.iter().find_map(|e| e.actual_date);

        let first_month = YearMonth::from_date(first.announce_date);
        let last_announce = group
            .last()
            .map_or(first.announce_date, |e| e.announce_date);
        let last_month = match actual_date {
            Some(d) => YearMonth::from_date(d),
            None => YearMonth::from_date(last_announce.max(fiscal_period_end)),
        };

        let mut rows = Vec::new();
        let mut previous_mean = None;
        let mut month = first_month;
        while month <= last_month {
            let stat_date = month.last_day();
            month = month.next();
            if actual_date.is_some_and(|d| stat_date >= d) {
                break;
            }

            // Latest forecast per analyst on or before the statistics date
            let mut live: HashMap<&str, f64> = HashMap::new();
            for e in group.iter().take_while(|e| e.announce_date <= stat_date) {
                if (stat_date - e.announce_date).num_days() <= self.config.max_age_days {
                    live.insert(e.analyst.as_str(), e.value);
                } else {
                    live.remove(e.analyst.as_str());
                }
            }
            if live.len() < self.config.min_analysts {
                continue;
            }

            let values: Vec<f64> = live.into_values().collect();
            let (Some(avg), Some(med)) = (mean(&values), median(&values)) else {
                continue;
            };
            let std = std_dev(&values);
            let low = values.iter().copied().fold(f64::INFINITY, f64::min);
            let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            rows.push(ConsensusRow {
                ticker: ticker.to_string(),
                fiscal_period_end,
                stat_date,
                n_analysts: values.len(),
                mean: avg,
                median: med,
                std,
                low,
                high,
                dispersion: std.filter(|_| avg != 0.0).map(|s| s / avg.abs()),
                revision: previous_mean.map(|p| avg - p),
                actual,
                surprise: actual.map(|a| a - avg),
            });
            previous_mean = Some(avg);
        }
        rows
    }
}
