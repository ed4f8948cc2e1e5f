//! Descriptive statistics over plain slices.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1); `None` with fewer than two values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

/// Percentile `q` in `[0, 1]` with linear interpolation between order
/// statistics (position `q * (n - 1)`).
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, q))
}

/// [`percentile`] on data that is already sorted ascending and non-empty.
pub(crate) fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Median (50th percentile).
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.5)
}

/// Summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    /// Number of values
    pub n: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation (NaN below two values)
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// Median
    pub median: f64,
    /// Maximum
    pub max: f64,
}

impl Describe {
    /// Describe a sample; `None` when it is empty.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            n: values.len(),
            mean,
            std: std_dev(values).unwrap_or(f64::NAN),
            min: sorted[0],
            median: percentile_sorted(&sorted, 0.5),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&v).unwrap(), 5.0);
        assert_relative_eq!(std_dev(&v).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(mean(&[]).is_none());
        assert!(std_dev(&[1.0]).is_none());
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(0.25, 1.75)]
    #[case(0.5, 2.5)]
    #[case(1.0, 4.0)]
    fn test_percentile_interpolates(#[case] q: f64, #[case] expected: f64) {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(percentile(&v, q).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_out_of_range() {
        assert!(percentile(&[1.0], 1.5).is_none());
    }

    #[test]
    fn test_median_odd() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_describe() {
        let d = Describe::of(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(d.n, 3);
        assert_relative_eq!(d.min, 1.0);
        assert_relative_eq!(d.max, 3.0);
        assert_relative_eq!(d.median, 2.0);
        assert_relative_eq!(d.std, 1.0);
        assert!(Describe::of(&[]).is_none());
    }
}
