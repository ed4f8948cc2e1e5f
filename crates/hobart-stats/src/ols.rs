//! Ordinary least squares.
//!
//! Two entry points:
//! - [`ols`] fits `y = Xb + e` for any number of regressors and reports
//!   classical standard errors, t-statistics and fit measures. The fitted
//!   model keeps `(X'X)^-1` so HAC standard errors can be computed afterwards.
//! - [`simple_ols`] is the closed-form bivariate case used inside rolling
//!   windows, where allocating a design matrix per window would dominate.

use crate::StatsError;
use crate::linalg::{invert, with_intercept};
use crate::newey_west::NeweyWestEstimator;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Result of a multivariate OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients (intercept first when fitted with one)
    pub coefficients: Array1<f64>,
    /// Classical standard errors
    pub std_errors: Array1<f64>,
    /// Coefficient / standard error
    pub t_stats: Array1<f64>,
    /// Residuals `y - Xb`
    pub residuals: Array1<f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// R-squared adjusted for the number of regressors
    pub adj_r_squared: f64,
    /// Residual standard deviation, `sqrt(SSR / (n - k))`
    pub sigma: f64,
    /// Number of observations
    pub n_obs: usize,
    /// Number of estimated parameters
    pub n_params: usize,
    /// Whether the first coefficient is an intercept
    pub intercept: bool,
    /// Design matrix actually used (with the intercept column if any)
    pub design: Array2<f64>,
    /// `(X'X)^-1` of the design
    pub xtx_inv: Array2<f64>,
}

impl OlsFit {
    /// The intercept, if one was fitted.
    pub fn alpha(&self) -> Option<f64> {
        self.intercept.then(|| self.coefficients[0])
    }

    /// Slope coefficients (everything but the intercept).
    pub fn slopes(&self) -> Array1<f64> {
        let start = usize::from(self.intercept);
        self.coefficients.slice(ndarray::s![start..]).to_owned()
    }

    /// Newey-West standard errors for every coefficient.
    ///
    /// Uses the sandwich `(X'X)^-1 (T S) (X'X)^-1` where `S` is the
    /// Bartlett-weighted long-run covariance of the scores `x_t e_t`.
    pub fn newey_west_std_errors(
        &self,
        estimator: &NeweyWestEstimator,
    ) -> Result<Array1<f64>, StatsError> {
        let mut scores = self.design.clone();
        for (mut row, e) in scores.axis_iter_mut(Axis(0)).zip(self.residuals.iter()) {
            row *= *e;
        }

        let long_run = estimator.long_run_covariance(&scores)?;
        let t = self.n_obs as f64;
        let meat = long_run * t;
        let cov = self.xtx_inv.dot(&meat).dot(&self.xtx_inv);

        Ok(cov.diag().mapv(|v| v.max(0.0).sqrt()))
    }

    /// Newey-West t-statistics for every coefficient.
    pub fn newey_west_t_stats(
        &self,
        estimator: &NeweyWestEstimator,
    ) -> Result<Array1<f64>, StatsError> {
        let se = self.newey_west_std_errors(estimator)?;
        Ok(&self.coefficients / &se)
    }
}

/// Fit `y` on the columns of `x` by least squares.
///
/// # Errors
/// * [`StatsError::DimensionMismatch`] if `y` and `x` disagree on rows
/// * [`StatsError::InsufficientData`] if there are not more rows than parameters
/// * [`StatsError::Singular`] if the regressors are collinear
pub fn ols(y: &Array1<f64>, x: &Array2<f64>, intercept: bool) -> Result<OlsFit, StatsError> {
    let n = y.len();
    if x.nrows() != n {
        return Err(StatsError::DimensionMismatch {
            expected: n,
            actual: x.nrows(),
        });
    }

    let design = if intercept {
        with_intercept(x)
    } else {
        x.clone()
    };
    let k = design.ncols();

    if n <= k {
        return Err(StatsError::InsufficientData {
            required: k + 1,
            actual: n,
        });
    }

    let xtx = design.t().dot(&design);
    let xtx_inv = invert(&xtx)?;
    let coefficients = xtx_inv.dot(&design.t().dot(y));

    let fitted = design.dot(&coefficients);
    let residuals = y - &fitted;
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();

    let sst: f64 = if intercept {
        let mean = y.sum() / n as f64;
        y.iter().map(|v| (v - mean).powi(2)).sum()
    } else {
        y.iter().map(|v| v * v).sum()
    };

    let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { 0.0 };
    let dof = (n - k) as f64;
    let adj_r_squared = if intercept {
        1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / dof
    } else {
        1.0 - (1.0 - r_squared) * n as f64 / dof
    };

    let sigma2 = ssr / dof;
    let std_errors = xtx_inv.diag().mapv(|v| (v.max(0.0) * sigma2).sqrt());
    let t_stats = &coefficients / &std_errors;

    Ok(OlsFit {
        coefficients,
        std_errors,
        t_stats,
        residuals,
        r_squared,
        adj_r_squared,
        sigma: sigma2.sqrt(),
        n_obs: n,
        n_params: k,
        intercept,
        design,
        xtx_inv,
    })
}

/// Result of a bivariate regression `y = alpha + beta * x + e`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleFit {
    /// Intercept
    pub alpha: f64,
    /// Slope
    pub beta: f64,
    /// Residual standard deviation with `n - 2` degrees of freedom
    pub resid_std: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Number of observations
    pub n_obs: usize,
}

/// Closed-form bivariate OLS.
///
/// # Errors
/// * [`StatsError::DimensionMismatch`] if `y` and `x` differ in length
/// * [`StatsError::InsufficientData`] with fewer than three observations
/// * [`StatsError::Singular`] if `x` is constant
pub fn simple_ols(y: &[f64], x: &[f64]) -> Result<SimpleFit, StatsError> {
    let n = y.len();
    if x.len() != n {
        return Err(StatsError::DimensionMismatch {
            expected: n,
            actual: x.len(),
        });
    }
    if n < 3 {
        return Err(StatsError::InsufficientData {
            required: 3,
            actual: n,
        });
    }

    let nf = n as f64;
    let mean_y = y.iter().sum::<f64>() / nf;
    let mean_x = x.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (yi, xi) in y.iter().zip(x) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON * nf * (1.0 + mean_x * mean_x) {
        return Err(StatsError::Singular);
    }

    let beta = sxy / sxx;
    let alpha = mean_y - beta * mean_x;
    // Residuals in a second pass; syy - beta * sxy cancels badly on tight fits
    let ssr: f64 = y
        .iter()
        .zip(x)
        .map(|(yi, xi)| {
            let e = (yi - mean_y) - beta * (xi - mean_x);
            e * e
        })
        .sum();
    let resid_std = (ssr / (nf - 2.0)).sqrt();
    let r_squared = if syy > 0.0 { 1.0 - ssr / syy } else { 0.0 };

    Ok(SimpleFit {
        alpha,
        beta,
        resid_std,
        r_squared,
        n_obs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newey_west::NeweyWestConfig;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_simple_ols_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 + 2.0 * v).collect();
        let fit = simple_ols(&y, &x).unwrap();
        assert_relative_eq!(fit.alpha, 0.5, epsilon = 1e-12);
        assert_relative_eq!(fit.beta, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.resid_std, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_ols_exact_fit_on_return_scale() {
        // Return-scale data with a nonzero mean
        let mut rng = StdRng::seed_from_u64(3);
        let x: Vec<f64> = (0..60).map(|_| 0.01 + rng.gen_range(-0.08..0.08)).collect();
        let y: Vec<f64> = x.iter().map(|m| 0.001 + 1.45 * m).collect();
        let fit = simple_ols(&y, &x).unwrap();
        assert_relative_eq!(fit.beta, 1.45, epsilon = 1e-12);
        assert!(fit.resid_std < 1e-12, "resid_std {}", fit.resid_std);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_ols_recovers_generating_slope() {
        let mut rng = StdRng::seed_from_u64(7);
        let x: Vec<f64> = (0..500).map(|_| rng.gen_range(-0.1..0.1)).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|m| 0.002 + 1.3 * m + rng.gen_range(-0.01..0.01))
            .collect();
        let fit = simple_ols(&y, &x).unwrap();
        assert!((fit.beta - 1.3).abs() < 0.05);
        assert!((fit.alpha - 0.002).abs() < 0.002);
        // Uniform(-0.01, 0.01) noise has std 0.01 / sqrt(3)
        assert!((fit.resid_std - 0.01 / 3.0_f64.sqrt()).abs() < 0.001);
    }

    #[test]
    fn test_simple_ols_constant_regressor() {
        let x = [1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!(matches!(simple_ols(&y, &x), Err(StatsError::Singular)));
    }

    #[test]
    fn test_simple_ols_too_few() {
        assert!(matches!(
            simple_ols(&[1.0, 2.0], &[1.0, 2.0]),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_ols_matches_simple_ols() {
        let xs = [0.01, -0.02, 0.03, 0.005, -0.01, 0.02];
        let ys = [0.015, -0.03, 0.05, 0.004, -0.012, 0.028];
        let simple = simple_ols(&ys, &xs).unwrap();

        let x = Array2::from_shape_vec((6, 1), xs.to_vec()).unwrap();
        let y = Array1::from_vec(ys.to_vec());
        let fit = ols(&y, &x, true).unwrap();

        assert_relative_eq!(fit.alpha().unwrap(), simple.alpha, epsilon = 1e-12);
        assert_relative_eq!(fit.slopes()[0], simple.beta, epsilon = 1e-12);
        assert_relative_eq!(fit.sigma, simple.resid_std, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, simple.r_squared, epsilon = 1e-12);
    }

    #[test]
    fn test_ols_two_regressors_exact() {
        // y = 1 + 2 a - 3 b
        let x = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [3.0, 5.0],
        ];
        let y = x.map_axis(Axis(1), |row| 1.0 + 2.0 * row[0] - 3.0 * row[1]);
        let fit = ols(&y, &x, true).unwrap();
        assert_relative_eq!(fit.coefficients[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[2], -3.0, epsilon = 1e-10);
        assert_eq!(fit.n_params, 3);
        assert_eq!(fit.n_obs, 5);
    }

    #[test]
    fn test_ols_intercept_only_standard_error() {
        // Regressing on a constant: alpha = mean, se = s / sqrt(n)
        let y = array![1.0, 2.0, 3.0, 4.0];
        let x = Array2::<f64>::zeros((4, 0));
        let fit = ols(&y, &x, true).unwrap();
        let s = (5.0_f64 / 3.0).sqrt();
        assert_relative_eq!(fit.coefficients[0], 2.5, epsilon = 1e-12);
        assert_relative_eq!(fit.std_errors[0], s / 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_ols_dimension_mismatch() {
        let y = array![1.0, 2.0, 3.0];
        let x = Array2::<f64>::zeros((4, 1));
        assert!(matches!(
            ols(&y, &x, true),
            Err(StatsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_newey_west_zero_lags_is_white_errors() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 200;
        let xs: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let y = Array1::from_iter(xs.iter().map(|v| 0.1 + 0.5 * v + rng.gen_range(-0.2..0.2)));
        let x = Array2::from_shape_vec((n, 1), xs).unwrap();
        let fit = ols(&y, &x, true).unwrap();

        let estimator = NeweyWestEstimator::new(NeweyWestConfig {
            lags: Some(0),
            ..Default::default()
        });
        let se = fit.newey_west_std_errors(&estimator).unwrap();

        // With homoskedastic noise, White and classical errors agree closely
        for (hac, classical) in se.iter().zip(fit.std_errors.iter()) {
            assert!((hac / classical - 1.0).abs() < 0.2);
        }
    }
}
