//! Typed panel records.
//!
//! Every record derives `Serialize`/`Deserialize` so the same structs are read
//! from delimited files and written back out. Field aliases accept the column
//! names common in research-warehouse extracts (`permno`/`ticker`, `prc`,
//! `vol`, `shrout`, `vwretd`, `mktrf`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One stock-period observation (a stock-month or stock-day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockObs {
    /// Entity identifier
    #[serde(alias = "symbol", alias = "ticker")]
    pub permno: String,

    /// Observation date
    pub date: NaiveDate,

    /// Holding-period return; non-numeric codes read as missing
    #[serde(default, alias = "returns", deserialize_with = "csv::invalid_option")]
    pub ret: Option<f64>,

    /// Price; negative values are bid/ask midpoints
    #[serde(default, alias = "prc", deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,

    /// Trading volume in shares
    #[serde(default, alias = "vol", deserialize_with = "csv::invalid_option")]
    pub volume: Option<f64>,

    /// Shares outstanding
    #[serde(default, alias = "shrout", deserialize_with = "csv::invalid_option")]
    pub shares_outstanding: Option<f64>,
}

impl StockObs {
    /// Create an observation with only a return.
    pub fn new(permno: impl Into<String>, date: NaiveDate, ret: Option<f64>) -> Self {
        Self {
            permno: permno.into(),
            date,
            ret,
            price: None,
            volume: None,
            shares_outstanding: None,
        }
    }

    /// Attach price, volume and shares outstanding.
    pub const fn with_trading(
        mut self,
        price: Option<f64>,
        volume: Option<f64>,
        shares_outstanding: Option<f64>,
    ) -> Self {
        self.price = price;
        self.volume = volume;
        self.shares_outstanding = shares_outstanding;
        self
    }

    /// Market capitalization, `|price| * shares`.
    pub fn market_cap(&self) -> Option<f64> {
        match (self.price, self.shares_outstanding) {
            (Some(p), Some(s)) if p.is_finite() && s > 0.0 => Some(p.abs() * s),
            _ => None,
        }
    }

    /// Dollar trading volume, `|price| * volume`.
    pub fn dollar_volume(&self) -> Option<f64> {
        match (self.price, self.volume) {
            (Some(p), Some(v)) if p.is_finite() && v > 0.0 => Some(p.abs() * v),
            _ => None,
        }
    }
}

/// Market index return for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObs {
    /// Period date
    pub date: NaiveDate,

    /// Market return (e.g. value-weighted index)
    #[serde(alias = "vwretd", alias = "mkt")]
    pub market_return: f64,

    /// Risk-free rate for the period, if supplied
    #[serde(default, alias = "rf")]
    pub risk_free: Option<f64>,
}

/// Factor returns for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorObs {
    /// Period date
    pub date: NaiveDate,

    /// Market excess return
    #[serde(alias = "mktrf")]
    pub mkt_rf: f64,

    /// Size factor
    #[serde(default)]
    pub smb: Option<f64>,

    /// Value factor
    #[serde(default)]
    pub hml: Option<f64>,

    /// Momentum factor
    #[serde(default, alias = "mom")]
    pub umd: Option<f64>,

    /// Aggregate liquidity innovation
    #[serde(default, alias = "liq_innov")]
    pub liq: Option<f64>,

    /// Risk-free rate
    pub rf: f64,
}

/// A single analyst's forecast of a fiscal-period figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystEstimate {
    /// Firm identifier
    #[serde(alias = "symbol")]
    pub ticker: String,

    /// Analyst (or broker) identifier
    #[serde(alias = "analys")]
    pub analyst: String,

    /// End of the forecast fiscal period
    #[serde(alias = "fpedats")]
    pub fiscal_period_end: NaiveDate,

    /// Date the estimate was issued
    #[serde(alias = "anndats")]
    pub announce_date: NaiveDate,

    /// Forecast value
    pub value: f64,

    /// Realized figure, once reported
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub actual: Option<f64>,

    /// Date the realized figure was reported
    #[serde(default, alias = "anndats_act")]
    pub actual_date: Option<NaiveDate>,
}

/// One period return of a named portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioObs {
    /// Period date
    pub date: NaiveDate,

    /// Portfolio label (e.g. `"1"`..`"10"`, `"H-L"`)
    pub portfolio: String,

    /// Portfolio return
    pub ret: f64,
}

/// One stock-period value of a computed measure, used to rank stocks into
/// portfolios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureValue {
    /// Security identifier
    #[serde(alias = "symbol", alias = "ticker")]
    pub permno: String,

    /// Period date
    pub date: NaiveDate,

    /// Measure value
    #[serde(alias = "measure", alias = "signal")]
    pub value: f64,
}

impl MeasureValue {
    /// Create a measure value.
    pub fn new(permno: impl Into<String>, date: NaiveDate, value: f64) -> Self {
        Self {
            permno: permno.into(),
            date,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_market_cap_uses_absolute_price() {
        let obs = StockObs::new("10001", date(2020, 1, 31), Some(0.01)).with_trading(
            Some(-25.0),
            Some(1_000.0),
            Some(200.0),
        );
        assert_eq!(obs.market_cap(), Some(5_000.0));
        assert_eq!(obs.dollar_volume(), Some(25_000.0));
    }

    #[test]
    fn test_market_cap_missing_inputs() {
        let obs = StockObs::new("10001", date(2020, 1, 31), None);
        assert_eq!(obs.market_cap(), None);
        assert_eq!(obs.dollar_volume(), None);
    }

    #[test]
    fn test_stock_obs_reads_warehouse_aliases() {
        let data = "permno,date,ret,prc,vol,shrout\n10001,2020-01-31,C,-12.5,100,50\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<StockObs> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ret, None);
        assert_eq!(rows[0].price, Some(-12.5));
        assert_eq!(rows[0].shares_outstanding, Some(50.0));
    }

    #[test]
    fn test_factor_obs_optional_columns() {
        let data = "date,mktrf,rf\n2020-01-31,0.01,0.001\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<FactorObs> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_relative_eq!(rows[0].mkt_rf, 0.01);
        assert!(rows[0].smb.is_none());
        assert!(rows[0].liq.is_none());
    }

    #[test]
    fn test_analyst_estimate_without_actual() {
        let data = "ticker,analys,fpedats,anndats,value,actual,anndats_act\n\
                    IBM,A1,2020-12-31,2020-03-02,2.05,,\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<AnalystEstimate> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].analyst, "A1");
        assert_eq!(rows[0].announce_date, date(2020, 3, 2));
        assert_relative_eq!(rows[0].value, 2.05);
        assert!(rows[0].actual.is_none());
        assert!(rows[0].actual_date.is_none());
    }
}
