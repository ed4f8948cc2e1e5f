//! Newey-West HAC (Heteroskedasticity and Autocorrelation Consistent) long-run covariance
//!
//! Monthly portfolio returns are serially correlated, so t-statistics on
//! alphas use a long-run covariance of the regression scores instead of the
//! classical `sigma^2 (X'X)^-1`.
//!
//! The estimator adds lagged cross-products with Bartlett kernel weights:
//! ```text
//! S = Γ_0 + Σ_{l=1}^{L} w_l * (Γ_l + Γ_l^T)
//! where:
//! - Γ_0 = sample covariance
//! - Γ_l = (1/T) Σ_{t=l+1}^T (g_t - μ)(g_{t-l} - μ)^T
//! - w_l = 1 - l/(L+1) (Bartlett kernel weights)
//! - L = ceil(4*(T/100)^(2/9)) unless fixed
//! ```
//!
//! # References
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use crate::StatsError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Newey-West estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeweyWestConfig {
    /// Minimum number of observations required (default: 3)
    pub min_observations: usize,

    /// Number of lags (None = automatic selection)
    /// When None, uses ceil(4*(T/100)^(2/9)) as recommended by Newey-West
    pub lags: Option<usize>,
}

impl Default for NeweyWestConfig {
    fn default() -> Self {
        Self {
            min_observations: 3,
            lags: None,
        }
    }
}

/// Newey-West HAC estimator
#[derive(Debug, Default, Clone)]
pub struct NeweyWestEstimator {
    config: NeweyWestConfig,
}

impl NeweyWestEstimator {
    /// Create a new Newey-West estimator with the given configuration
    pub const fn new(config: NeweyWestConfig) -> Self {
        Self { config }
    }

    /// Estimator with a fixed lag length.
    pub fn with_lags(lags: usize) -> Self {
        Self::new(NeweyWestConfig {
            lags: Some(lags),
            ..Default::default()
        })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &NeweyWestConfig {
        &self.config
    }

    /// Lag length for a sample of `n_periods`.
    ///
    /// Formula: L = ceil(4 * (T/100)^(2/9)) unless a fixed lag is configured.
    pub fn optimal_lags(&self, n_periods: usize) -> usize {
        self.config.lags.unwrap_or_else(|| {
            let t = n_periods as f64;
            let lags = 4.0 * (t / 100.0).powf(2.0 / 9.0);
            lags.ceil() as usize
        })
    }

    /// Bartlett kernel weight: w_l = 1 - l/(L+1) for l = 1, ..., L
    fn bartlett_weight(&self, lag: usize, max_lag: usize) -> f64 {
        if lag == 0 {
            1.0
        } else if lag <= max_lag {
            1.0 - (lag as f64) / (max_lag as f64 + 1.0)
        } else {
            0.0
        }
    }

    fn compute_means(&self, series: &Array2<f64>) -> Array1<f64> {
        let (n_periods, n_cols) = series.dim();
        let mut means = Array1::<f64>::zeros(n_cols);

        for j in 0..n_cols {
            let sum: f64 = series.column(j).sum();
            means[j] = sum / n_periods as f64;
        }

        means
    }

    /// Lagged autocovariance Γ_l, normalized by T (not T-l)
    fn compute_lagged_covariance(
        &self,
        series: &Array2<f64>,
        means: &Array1<f64>,
        lag: usize,
    ) -> Array2<f64> {
        let (n_periods, n_cols) = series.dim();
        let mut cov_lag = Array2::<f64>::zeros((n_cols, n_cols));

        for t in lag..n_periods {
            for i in 0..n_cols {
                for j in 0..n_cols {
                    let gi_t = series[[t, i]] - means[i];
                    let gj_t_lag = series[[t - lag, j]] - means[j];
                    cov_lag[[i, j]] += gi_t * gj_t_lag;
                }
            }
        }

        cov_lag /= n_periods as f64;
        cov_lag
    }

    /// Long-run covariance of the columns of `series` (rows are periods).
    pub fn long_run_covariance(&self, series: &Array2<f64>) -> Result<Array2<f64>, StatsError> {
        let (n_periods, n_cols) = series.dim();

        if n_periods < self.config.min_observations.max(1) {
            return Err(StatsError::InsufficientData {
                required: self.config.min_observations.max(1),
                actual: n_periods,
            });
        }

        // Never use more lags than the sample supports
        let max_lag = self.optimal_lags(n_periods).min(n_periods - 1);
        let means = self.compute_means(series);

        let mut cov = self.compute_lagged_covariance(series, &means, 0);

        for lag in 1..=max_lag {
            let weight = self.bartlett_weight(lag, max_lag);
            let cov_lag = self.compute_lagged_covariance(series, &means, lag);

            for i in 0..n_cols {
                for j in 0..n_cols {
                    cov[[i, j]] += weight * (cov_lag[[i, j]] + cov_lag[[j, i]]);
                }
            }
        }

        Ok(cov)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_default() {
        let config = NeweyWestConfig::default();
        assert_eq!(config.min_observations, 3);
        assert!(config.lags.is_none());
    }

    #[test]
    fn test_optimal_lags() {
        let estimator = NeweyWestEstimator::default();

        // ceil(4 * 1) = 4
        assert_eq!(estimator.optimal_lags(100), 4);
        // 5^(2/9) ≈ 1.427, ceil(5.71) = 6
        assert_eq!(estimator.optimal_lags(500), 6);
        // 10^(2/9) ≈ 1.668, ceil(6.67) = 7
        assert_eq!(estimator.optimal_lags(1000), 7);
    }

    #[test]
    fn test_optimal_lags_manual() {
        let estimator = NeweyWestEstimator::with_lags(10);
        assert_eq!(estimator.optimal_lags(100), 10);
        assert_eq!(estimator.optimal_lags(500), 10);
    }

    #[test]
    fn test_bartlett_weight() {
        let estimator = NeweyWestEstimator::default();
        let max_lag = 4;

        assert_relative_eq!(estimator.bartlett_weight(0, max_lag), 1.0);
        assert_relative_eq!(estimator.bartlett_weight(1, max_lag), 0.8);
        assert_relative_eq!(estimator.bartlett_weight(2, max_lag), 0.6);
        assert_relative_eq!(estimator.bartlett_weight(4, max_lag), 0.2);
        assert_relative_eq!(estimator.bartlett_weight(5, max_lag), 0.0);
    }

    #[test]
    fn test_zero_lags_is_sample_covariance() {
        #[rustfmt::skip]
        let series = Array2::from_shape_vec(
            (4, 1),
            vec![1.0, 2.0, 3.0, 4.0],
        ).unwrap();

        let estimator = NeweyWestEstimator::with_lags(0);
        let cov = estimator.long_run_covariance(&series).unwrap();
        // Population variance of 1..4 is 1.25
        assert_relative_eq!(cov[[0, 0]], 1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_positive_autocorrelation_raises_variance() {
        let n = 200;
        let mut series = Array2::<f64>::zeros((n, 1));
        let mut state = 0.0;
        for t in 0..n {
            // Deterministic AR(1)-like path with persistent sign runs
            let shock = if (t / 10) % 2 == 0 { 1.0 } else { -1.0 };
            state = 0.7 * state + shock;
            series[[t, 0]] = state;
        }

        let short = NeweyWestEstimator::with_lags(0)
            .long_run_covariance(&series)
            .unwrap();
        let long = NeweyWestEstimator::with_lags(6)
            .long_run_covariance(&series)
            .unwrap();
        assert!(long[[0, 0]] > short[[0, 0]]);
    }

    #[test]
    fn test_symmetry() {
        #[rustfmt::skip]
        let series = Array2::from_shape_vec(
            (5, 2),
            vec![
                0.01, 0.02,
                0.02, 0.01,
                -0.01, 0.01,
                0.01, -0.02,
                -0.01, 0.01,
            ],
        ).unwrap();

        let cov = NeweyWestEstimator::with_lags(1)
            .long_run_covariance(&series)
            .unwrap();
        assert_eq!(cov.shape(), &[2, 2]);
        assert_relative_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-12);
        assert!(cov[[0, 0]] >= 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        let series = Array2::<f64>::zeros((2, 1));
        assert!(
            NeweyWestEstimator::default()
                .long_run_covariance(&series)
                .is_err()
        );
    }

    #[test]
    fn test_large_lag_clamping() {
        let series = Array2::<f64>::from_elem((10, 2), 0.01);
        let result = NeweyWestEstimator::with_lags(100).long_run_covariance(&series);
        assert!(result.is_ok());
    }
}
