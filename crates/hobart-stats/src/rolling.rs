//! Trailing-window regressions.
//!
//! For each observation `t` the regression uses every observation whose
//! period index lies in `(p_t - window, p_t]`. Windows are measured in
//! periods, not rows, so a gap in an entity's history leaves fewer
//! observations in the window rather than reaching further back.
//! An estimate is produced once the window holds `min_periods` observations.

use crate::StatsError;
use crate::ols::{OlsFit, SimpleFit, ols, simple_ols};
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Configuration for trailing-window regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Window length in periods (default: 60)
    pub window: usize,
    /// Minimum observations inside the window (default: 24)
    pub min_periods: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: 60,
            min_periods: 24,
        }
    }
}

/// Trailing-window OLS over a single ordered series
#[derive(Debug, Clone, Default)]
pub struct RollingRegression {
    config: RollingConfig,
}

impl RollingRegression {
    /// Create a rolling regression, validating the configuration.
    pub fn new(config: RollingConfig) -> Result<Self, StatsError> {
        if config.window == 0 {
            return Err(StatsError::InvalidParameter(
                "window must be positive".to_string(),
            ));
        }
        if config.min_periods > config.window {
            return Err(StatsError::InvalidParameter(format!(
                "min_periods ({}) exceeds window ({})",
                config.min_periods, config.window
            )));
        }
        Ok(Self { config })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &RollingConfig {
        &self.config
    }

    /// Row range `[start, end]` of the window ending at row `end`.
    fn window_start(&self, periods: &[i64], end: usize, mut start: usize) -> usize {
        let lower = periods[end] - self.config.window as i64;
        while start < end && periods[start] <= lower {
            start += 1;
        }
        start
    }

    fn check_sorted(periods: &[i64]) -> Result<(), StatsError> {
        if periods.windows(2).any(|w| w[0] > w[1]) {
            return Err(StatsError::InvalidParameter(
                "periods must be sorted ascending".to_string(),
            ));
        }
        Ok(())
    }

    /// Bivariate rolling regression of `y` on `x`.
    ///
    /// Returns one entry per input row; `None` where the window is too thin or
    /// the regressor is constant inside it.
    pub fn simple(
        &self,
        periods: &[i64],
        y: &[f64],
        x: &[f64],
    ) -> Result<Vec<Option<SimpleFit>>, StatsError> {
        let n = periods.len();
        if y.len() != n || x.len() != n {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: y.len().min(x.len()),
            });
        }
        Self::check_sorted(periods)?;

        let min_obs = self.config.min_periods.max(3);
        let mut out = Vec::with_capacity(n);
        let mut start = 0;
        for end in 0..n {
            start = self.window_start(periods, end, start);
            let count = end - start + 1;
            if count < min_obs {
                out.push(None);
                continue;
            }
            match simple_ols(&y[start..=end], &x[start..=end]) {
                Ok(fit) => out.push(Some(fit)),
                Err(e) => {
                    trace!(row = end, error = %e, "rolling window skipped");
                    out.push(None);
                }
            }
        }
        Ok(out)
    }

    /// Multivariate rolling regression of `y` on the columns of `x` with an
    /// intercept.
    pub fn multiple(
        &self,
        periods: &[i64],
        y: &Array1<f64>,
        x: &Array2<f64>,
    ) -> Result<Vec<Option<OlsFit>>, StatsError> {
        let n = periods.len();
        if y.len() != n || x.nrows() != n {
            return Err(StatsError::DimensionMismatch {
                expected: n,
                actual: y.len().min(x.nrows()),
            });
        }
        Self::check_sorted(periods)?;

        let min_obs = self.config.min_periods.max(x.ncols() + 2);
        let mut out = Vec::with_capacity(n);
        let mut start = 0;
        for end in 0..n {
            start = self.window_start(periods, end, start);
            let count = end - start + 1;
            if count < min_obs {
                out.push(None);
                continue;
            }
            let y_w = y.slice(s![start..=end]).to_owned();
            let x_w = x.slice(s![start..=end, ..]).to_owned();
            match ols(&y_w, &x_w, true) {
                Ok(fit) => out.push(Some(fit)),
                Err(e) => {
                    trace!(row = end, error = %e, "rolling window skipped");
                    out.push(None);
                }
            }
        }
        Ok(out)
    }
}
