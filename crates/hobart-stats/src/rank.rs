//! Cross-sectional ranking into buckets (deciles, quintiles, ...).

use crate::StatsError;
use crate::descriptive::percentile_sorted;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How observations are assigned to buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMethod {
    /// Rank-based: bucket = floor(rank * n / count). Groups differ in size by
    /// at most one; tied values share the bucket of their lowest rank.
    #[default]
    Rank,
    /// Percentile breakpoints at k/n (linear interpolation); a value equal to
    /// a breakpoint falls in the lower bucket.
    Breakpoints,
}

impl fmt::Display for BucketMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rank => write!(f, "rank"),
            Self::Breakpoints => write!(f, "breakpoints"),
        }
    }
}

impl FromStr for BucketMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" => Ok(Self::Rank),
            "breakpoints" | "percentile" => Ok(Self::Breakpoints),
            other => Err(format!("unknown bucket method: {other}")),
        }
    }
}

/// Assign each value a zero-based bucket in `0..n_buckets`.
///
/// Missing and non-finite values get `None`.
pub fn assign_buckets(
    values: &[Option<f64>],
    n_buckets: usize,
    method: BucketMethod,
) -> Result<Vec<Option<usize>>, StatsError> {
    if n_buckets == 0 {
        return Err(StatsError::InvalidParameter(
            "number of buckets must be positive".to_string(),
        ));
    }

    let mut ranked: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();

    let mut buckets = vec![None; values.len()];
    if ranked.is_empty() {
        return Ok(buckets);
    }
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    let count = ranked.len();

    match method {
        BucketMethod::Rank => {
            let mut tie_rank = 0;
            for (rank, &(idx, value)) in ranked.iter().enumerate() {
                if rank == 0 || value != ranked[rank - 1].1 {
                    tie_rank = rank;
                }
                buckets[idx] = Some(tie_rank * n_buckets / count);
            }
        }
        BucketMethod::Breakpoints => {
            let sorted: Vec<f64> = ranked.iter().map(|&(_, v)| v).collect();
            let cuts = breakpoints_sorted(&sorted, n_buckets);
            for &(idx, value) in &ranked {
                let bucket = cuts.iter().filter(|&&cut| value > cut).count();
                buckets[idx] = Some(bucket);
            }
        }
    }

    Ok(buckets)
}

/// Interior breakpoints at percentiles k/n, k = 1..n-1.
pub fn breakpoints(values: &[f64], n_buckets: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || n_buckets < 2 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);
    breakpoints_sorted(&sorted, n_buckets)
}

fn breakpoints_sorted(sorted: &[f64], n_buckets: usize) -> Vec<f64> {
    (1..n_buckets)
        .map(|k| percentile_sorted(sorted, k as f64 / n_buckets as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn counts(buckets: &[Option<usize>], n: usize) -> Vec<usize> {
        let mut c = vec![0; n];
        for b in buckets.iter().flatten() {
            c[*b] += 1;
        }
        c
    }

    #[rstest]
    #[case(100, 10)]
    #[case(95, 10)]
    #[case(7, 5)]
    fn test_rank_buckets_are_equal_sized(#[case] n_values: usize, #[case] n_buckets: usize) {
        let values: Vec<Option<f64>> = (0..n_values).map(|i| Some((i * 37 % 101) as f64)).collect();
        let buckets = assign_buckets(&values, n_buckets, BucketMethod::Rank).unwrap();
        let c = counts(&buckets, n_buckets);
        let min = *c.iter().min().unwrap();
        let max = *c.iter().max().unwrap();
        assert!(max - min <= 1, "bucket sizes {c:?}");
        assert_eq!(c.iter().sum::<usize>(), n_values);
    }

    #[test]
    fn test_rank_buckets_are_monotone() {
        let values: Vec<Option<f64>> = vec![Some(5.0), Some(1.0), Some(3.0), Some(2.0), Some(4.0)];
        let buckets = assign_buckets(&values, 5, BucketMethod::Rank).unwrap();
        assert_eq!(buckets, vec![Some(4), Some(0), Some(2), Some(1), Some(3)]);
    }

    #[test]
    fn test_missing_values_unassigned() {
        let values = vec![Some(1.0), None, Some(f64::NAN), Some(2.0)];
        let buckets = assign_buckets(&values, 2, BucketMethod::Rank).unwrap();
        assert_eq!(buckets, vec![Some(0), None, None, Some(1)]);
    }

    #[test]
    fn test_ties_share_bucket() {
        let values = vec![Some(1.0), Some(1.0), Some(1.0), Some(2.0)];
        let buckets = assign_buckets(&values, 2, BucketMethod::Rank).unwrap();
        assert_eq!(buckets, vec![Some(0), Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_breakpoint_buckets() {
        let values: Vec<Option<f64>> = (1..=10).map(|i| Some(i as f64)).collect();
        let buckets = assign_buckets(&values, 2, BucketMethod::Breakpoints).unwrap();
        // Median breakpoint is 5.5
        assert_eq!(buckets[4], Some(0));
        assert_eq!(buckets[5], Some(1));
    }

    #[test]
    fn test_breakpoints() {
        let cuts = breakpoints(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert_eq!(cuts, vec![2.0, 3.0, 4.0]);
        assert!(breakpoints(&[], 10).is_empty());
    }

    #[test]
    fn test_zero_buckets_rejected() {
        assert!(assign_buckets(&[Some(1.0)], 0, BucketMethod::Rank).is_err());
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("Rank".parse::<BucketMethod>().unwrap(), BucketMethod::Rank);
        assert_eq!(
            "percentile".parse::<BucketMethod>().unwrap(),
            BucketMethod::Breakpoints
        );
    }
}
