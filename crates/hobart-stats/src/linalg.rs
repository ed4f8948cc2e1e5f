//! Small dense linear algebra helpers.
//!
//! Regression designs here have a handful of columns, so a direct
//! Gauss-Jordan inverse with partial pivoting is sufficient and keeps the
//! workspace free of a LAPACK dependency.

use crate::StatsError;
use ndarray::Array2;

/// Pivot magnitude below which a matrix is treated as singular, relative to
/// the largest absolute entry.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// * [`StatsError::DimensionMismatch`] if the matrix is not square
/// * [`StatsError::Singular`] if a pivot vanishes
pub fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>, StatsError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(StatsError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }
    if n == 0 {
        return Ok(Array2::zeros((0, 0)));
    }

    let scale = matrix.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(StatsError::Singular);
    }

    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        // Partial pivoting: largest remaining entry in this column
        let mut pivot_row = col;
        let mut pivot_val = a[[col, col]].abs();
        for row in (col + 1)..n {
            let val = a[[row, col]].abs();
            if val > pivot_val {
                pivot_val = val;
                pivot_row = row;
            }
        }

        if pivot_val < SINGULAR_TOLERANCE * scale {
            return Err(StatsError::Singular);
        }

        if pivot_row != col {
            swap_rows(&mut a, col, pivot_row);
            swap_rows(&mut inv, col, pivot_row);
        }

        let pivot = a[[col, col]];
        for j in 0..n {
            a[[col, j]] /= pivot;
            inv[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                let (a_cj, inv_cj) = (a[[col, j]], inv[[col, j]]);
                a[[row, j]] -= factor * a_cj;
                inv[[row, j]] -= factor * inv_cj;
            }
        }
    }

    Ok(inv)
}

fn swap_rows(m: &mut Array2<f64>, r1: usize, r2: usize) {
    for j in 0..m.ncols() {
        m.swap([r1, j], [r2, j]);
    }
}

/// Prepend a column of ones to `x`.
pub fn with_intercept(x: &Array2<f64>) -> Array2<f64> {
    let (n, k) = x.dim();
    Array2::from_shape_fn((n, k + 1), |(i, j)| if j == 0 { 1.0 } else { x[[i, j - 1]] })
}
