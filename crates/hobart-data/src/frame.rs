//! Conversions between typed records and polars frames.

use crate::error::Result;
use crate::records::StockObs;
use chrono::NaiveDate;
use polars::prelude::*;

/// Build a frame with the column names used by frame-based measures:
/// `symbol`, `date`, `returns`, `price`, `volume`, `shares_outstanding`.
pub fn stocks_to_frame(obs: &[StockObs]) -> Result<DataFrame> {
    let symbols: Vec<&str> = obs.iter().map(|o| o.permno.as_str()).collect();
    let dates: Vec<NaiveDate> = obs.iter().map(|o| o.date).collect();
    let returns: Vec<Option<f64>> = obs.iter().map(|o| o.ret).collect();
    let prices: Vec<Option<f64>> = obs.iter().map(|o| o.price).collect();
    let volumes: Vec<Option<f64>> = obs.iter().map(|o| o.volume).collect();
    let shares: Vec<Option<f64>> = obs.iter().map(|o| o.shares_outstanding).collect();

    let df = DataFrame::new(vec![
        Series::new("symbol".into(), symbols).into(),
        Series::new("date".into(), dates).into(),
        Series::new("returns".into(), returns).into(),
        Series::new("price".into(), prices).into(),
        Series::new("volume".into(), volumes).into(),
        Series::new("shares_outstanding".into(), shares).into(),
    ])?;
    Ok(df)
}

/// Extract a numeric column as `f64`, casting integer columns.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Extract a string column.
pub fn column_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Extract a date column.
pub fn column_date(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Date)?;
    Ok(series.date()?.as_date_iter().collect())
}
