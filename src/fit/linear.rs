//! Closed-form simple linear regression of labor force (y) on population (x).
//!
//! With `n` rows and the sums `Sx, Sy, Sxy, Sxx`:
//!
//! ```text
//! b = (n·Sxy − Sx·Sy) / (n·Sxx − Sx²)
//! a = (Sy − b·Sx) / n
//! r = Σ(x−x̄)(y−ȳ) / sqrt(Σ(x−x̄)² · Σ(y−ȳ)²)
//! ```
//!
//! Every denominator is checked before dividing. A zero actual value only
//! leaves that row's percentage error undefined; the fit itself still succeeds.

use crate::domain::{
    CrossCheck, FitQuality, Prediction, ReconciledRow, RegressionResult, SumsRow, SumsTable, SumsTotals,
};
use crate::error::RegressionError;
use crate::math::fit_line_svd;

/// Disagreement above which the SVD cross-check is logged as a warning.
pub const CROSS_CHECK_TOLERANCE: f64 = 1e-6;

/// Build the regression worksheet: per-row `x, y, x², y², xy` plus totals.
pub fn sums_table(rows: &[ReconciledRow]) -> SumsTable {
    let mut totals = SumsTotals {
        n: rows.len(),
        ..SumsTotals::default()
    };
    let rows: Vec<SumsRow> = rows
        .iter()
        .map(|r| {
            let row = SumsRow {
                year: r.year,
                x: r.x,
                y: r.y,
                x2: r.x * r.x,
                y2: r.y * r.y,
                xy: r.x * r.y,
            };
            totals.x += row.x;
            totals.y += row.y;
            totals.x2 += row.x2;
            totals.y2 += row.y2;
            totals.xy += row.xy;
            row
        })
        .collect();
    SumsTable { rows, totals }
}

/// Coefficients straight from the worksheet totals:
/// `a = (Sy·Sxx − Sx·Sxy) / D`, `b = (n·Sxy − Sx·Sy) / D`, `D = n·Sxx − Sx²`.
pub fn coefficients_from_totals(t: &SumsTotals) -> Result<(f64, f64), RegressionError> {
    if t.n < 2 {
        return Err(RegressionError::InsufficientData { n: t.n });
    }
    let n = t.n as f64;
    let den = n * t.x2 - t.x * t.x;
    if !(den.is_finite() && den > 0.0) {
        return Err(RegressionError::DegenerateInput {
            reason: "n·Σx² − (Σx)² is zero (all x values identical)",
        });
    }
    let a = (t.y * t.x2 - t.x * t.xy) / den;
    let b = (n * t.xy - t.x * t.y) / den;
    Ok((a, b))
}

/// `|actual − predicted| / actual × 100`.
pub fn percentage_error(year: i32, actual: f64, predicted: f64) -> Result<f64, RegressionError> {
    if actual == 0.0 {
        return Err(RegressionError::ZeroActual { year });
    }
    Ok((actual - predicted).abs() / actual * 100.0)
}

/// Fit `y = a + b·x` over the reconciled rows.
pub fn fit_regression(rows: &[ReconciledRow]) -> Result<RegressionResult, RegressionError> {
    let n_rows = rows.len();
    if n_rows < 2 {
        return Err(RegressionError::InsufficientData { n: n_rows });
    }
    let first_x = rows[0].x;
    if rows.iter().all(|r| r.x == first_x) {
        return Err(RegressionError::DegenerateInput {
            reason: "all x values are identical",
        });
    }

    let sums = sums_table(rows);
    let t = sums.totals;
    let n = n_rows as f64;

    let den = n * t.x2 - t.x * t.x;
    if !(den.is_finite() && den > 0.0) {
        return Err(RegressionError::DegenerateInput {
            reason: "n·Σx² − (Σx)² is zero",
        });
    }
    let slope = (n * t.xy - t.x * t.y) / den;
    let intercept = (t.y - slope * t.x) / n;

    let correlation = correlation(rows)?;
    let determination = correlation * correlation;

    let predictions: Vec<Prediction> = rows
        .iter()
        .map(|r| {
            let predicted = intercept + slope * r.x;
            let error_pct = match percentage_error(r.year, r.y, predicted) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("{e}");
                    None
                }
            };
            Prediction {
                year: r.year,
                x: r.x,
                actual: r.y,
                predicted,
                residual: r.y - predicted,
                error_pct,
            }
        })
        .collect();

    let quality = fit_quality(&predictions);
    let cross_check = cross_check(rows, intercept, slope);

    log::info!(
        "fit over {n_rows} year(s): a={intercept:.2}, b={slope:.6}, r={correlation:.4}, r²={determination:.4}"
    );

    Ok(RegressionResult {
        intercept,
        slope,
        correlation,
        determination,
        predictions,
        sums,
        quality,
        cross_check,
    })
}

/// Pearson correlation, clamped to `[-1, 1]` against rounding.
pub fn correlation(rows: &[ReconciledRow]) -> Result<f64, RegressionError> {
    let n = rows.len();
    if n < 2 {
        return Err(RegressionError::InsufficientData { n });
    }
    let mean_x = rows.iter().map(|r| r.x).sum::<f64>() / n as f64;
    let mean_y = rows.iter().map(|r| r.y).sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for r in rows {
        let dx = r.x - mean_x;
        let dy = r.y - mean_y;
        num += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    let first_y = rows[0].y;
    if ss_x <= 0.0 {
        return Err(RegressionError::DegenerateInput {
            reason: "x has no variance",
        });
    }
    if ss_y <= 0.0 || rows.iter().all(|r| r.y == first_y) {
        return Err(RegressionError::DegenerateInput {
            reason: "y has no variance",
        });
    }

    let r = num / (ss_x * ss_y).sqrt();
    Ok(r.clamp(-1.0, 1.0))
}

fn fit_quality(predictions: &[Prediction]) -> FitQuality {
    let n = predictions.len();
    let sse: f64 = predictions.iter().map(|p| p.residual * p.residual).sum();
    let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };

    let defined: Vec<f64> = predictions.iter().filter_map(|p| p.error_pct).collect();
    let mape = if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    };

    FitQuality { sse, rmse, mape, n }
}

/// Compare the closed form with an SVD solve.
///
/// The disagreement is measured on fitted values, relative to the largest
/// `|y|`, so it stays meaningful when the intercept is near zero.
fn cross_check(rows: &[ReconciledRow], intercept: f64, slope: f64) -> Option<CrossCheck> {
    let xs: Vec<f64> = rows.iter().map(|r| r.x).collect();
    let ys: Vec<f64> = rows.iter().map(|r| r.y).collect();
    let Some((a, b)) = fit_line_svd(&xs, &ys) else {
        log::warn!("SVD reference fit failed; skipping cross-check");
        return None;
    };

    let scale = ys.iter().map(|y| y.abs()).fold(1.0, f64::max);
    let rel_delta = xs
        .iter()
        .map(|&x| ((intercept + slope * x) - (a + b * x)).abs() / scale)
        .fold(0.0, f64::max);

    if rel_delta > CROSS_CHECK_TOLERANCE {
        log::warn!("closed-form and SVD fits disagree: relative delta {rel_delta:.3e}");
    } else {
        log::debug!("SVD cross-check ok: relative delta {rel_delta:.3e}");
    }

    Some(CrossCheck {
        intercept: a,
        slope: b,
        rel_delta,
    })
}
