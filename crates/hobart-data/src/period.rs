//! Calendar keys for panel observations.
//!
//! Monthly panels are keyed by [`YearMonth`]; window arithmetic works on a
//! plain integer period index so that gaps in an entity's history shrink the
//! window instead of silently widening it. Daily windows count trading days
//! of the market calendar.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observation frequency of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One observation per trading day
    Daily,
    /// One observation per calendar month
    #[default]
    Monthly,
}

impl Frequency {
    /// Integer calendar key of a date at this frequency.
    ///
    /// Months since year 0 for monthly data, so consecutive months differ by
    /// one. For daily data the key is the day number since the common era;
    /// it matches a stock day with its market day but is not a window index,
    /// see [`merge_market`](crate::merge_market) for trading-day positions.
    pub fn period_index(&self, date: NaiveDate) -> i64 {
        match self {
            Self::Daily => i64::from(date.num_days_from_ce()),
            Self::Monthly => YearMonth::from_date(date).index(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(Self::Daily),
            "monthly" | "m" => Ok(Self::Monthly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year
    pub year: i32,
    /// Month of year, 1-12
    pub month: u32,
}

impl YearMonth {
    /// Create a month key. Returns `None` for months outside 1-12.
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since January of year 0.
    pub const fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Inverse of [`YearMonth::index`].
    pub const fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        Self {
            year: year as i32,
            month: month as u32,
        }
    }

    /// The following month.
    pub const fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// The preceding month.
    pub const fn prev(&self) -> Self {
        Self::from_index(self.index() - 1)
    }

    /// Shift by `months` (may be negative).
    pub const fn offset(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
