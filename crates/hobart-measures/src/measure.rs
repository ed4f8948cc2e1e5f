//! Common interface of frame-based measures.

use crate::error::{MeasureError, Result};
use hobart_data::MeasureValue;
use hobart_data::frame::{column_date, column_f64, column_str};
use polars::prelude::*;

/// A stock-level measure computed from a panel frame.
///
/// Implementations receive a lazy frame holding at least
/// [`Measure::required_columns`] and return a lazy frame keyed by
/// `symbol` and `date` with one column named after the measure.
pub trait Measure {
    /// Unique measure name; also the name of the output column.
    fn name(&self) -> &str;

    /// Columns the input frame must provide.
    fn required_columns(&self) -> &[&str];

    /// Build the computation over `data`.
    fn compute(&self, data: LazyFrame) -> Result<LazyFrame>;

    /// Check the input schema, then compute.
    fn compute_checked(&self, mut data: LazyFrame) -> Result<LazyFrame> {
        let schema = data.collect_schema()?;
        if let Some(missing) = self
            .required_columns()
            .iter()
            .find(|c| !schema.contains(c))
        {
            return Err(MeasureError::MissingColumn {
                measure: self.name().to_string(),
                column: (*missing).to_string(),
            });
        }
        self.compute(data)
    }
}

/// Collect a measure frame into typed values, dropping missing entries.
///
/// `frame` must carry `symbol`, `date` and `column`.
pub fn collect_values(frame: LazyFrame, column: &str) -> Result<Vec<MeasureValue>> {
    let df = frame.collect()?;
    let symbols = column_str(&df, "symbol")?;
    let dates = column_date(&df, "date")?;
    let values = column_f64(&df, column)?;

    let out = symbols
        .into_iter()
        .zip(dates)
        .zip(values)
        .filter_map(|((symbol, date), value)| {
            let value = value.filter(|v| v.is_finite())?;
            Some(MeasureValue::new(symbol?, date?, value))
        })
        .collect();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_collect_values_skips_missing() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let frame = df!(
            "symbol" => ["A", "B", "C"],
            "date" => [d, d, d],
            "amihud" => [Some(1.5), None, Some(f64::NAN)],
        )
        .unwrap();
        let values = collect_values(frame.lazy(), "amihud").unwrap();
        assert_eq!(values, vec![MeasureValue::new("A", d, 1.5)]);
    }
}
