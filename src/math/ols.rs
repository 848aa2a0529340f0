//! Reference least-squares solve for a straight line.
//!
//! The regression engine uses the closed-form normal equations. This module
//! solves the same problem through a different route (SVD of the `[1, x]`
//! design matrix) so the two answers can be compared:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! The x values are centered and scaled before the solve. Population counts
//! are in the millions, and an unscaled `[1, x]` matrix is badly conditioned.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = a + b x` by SVD. Returns `(a, b)`.
pub fn fit_line_svd(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let mean = xs.iter().sum::<f64>() / n as f64;
    let scale = xs.iter().map(|x| (x - mean).abs()).fold(0.0, f64::max);
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }

    // Columns: [1, (x - mean) / scale]
    let mut data = Vec::with_capacity(n * 2);
    for &x in xs {
        data.push(1.0);
        data.push((x - mean) / scale);
    }
    let design = DMatrix::from_row_slice(n, 2, &data);
    let target = DVector::from_row_slice(ys);

    let beta = solve_least_squares(&design, &target)?;

    // Undo the change of variables.
    let b = beta[1] / scale;
    let a = beta[0] - b * mean;
    Some((a, b))
}
