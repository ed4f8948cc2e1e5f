//! Cross-sectional standardization.

use hobart_data::{MeasureValue, YearMonth};
use hobart_stats::{mean, std_dev};
use std::collections::BTreeMap;

/// Replace each value by its z-score within its calendar month.
///
/// Months with fewer than two stocks or zero dispersion are dropped.
pub fn standardize_by_month(values: &[MeasureValue]) -> Vec<MeasureValue> {
    let mut by_month: BTreeMap<YearMonth, Vec<&MeasureValue>> = BTreeMap::new();
    for v in values {
        by_month.entry(YearMonth::from_date(v.date)).or_default().push(v);
    }

    let mut out = Vec::with_capacity(values.len());
    for rows in by_month.values() {
        let raw: Vec<f64> = rows.iter().map(|v| v.value).collect();
        let (Some(m), Some(s)) = (mean(&raw), std_dev(&raw)) else {
            continue;
        };
        if s <= 0.0 {
            continue;
        }
        out.extend(
            rows.iter()
                .map(|v| MeasureValue::new(v.permno.clone(), v.date, (v.value - m) / s)),
        );
    }
    out
}
