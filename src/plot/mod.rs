//! Charts of actual vs fitted labor force over years.
//!
//! Every renderer (terminal, SVG, PDF) draws from the same [`ChartData`], so
//! the series and bounds are computed once per result.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::RegressionResult;

/// Series and bounds for an actual-vs-fitted chart, x = year.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Observed labor force by year.
    pub actual: Vec<(f64, f64)>,
    /// Regression line evaluated at each year's population.
    pub fitted: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    /// Unpadded.
    pub y_bounds: [f64; 2],
}

impl ChartData {
    pub fn from_result(result: &RegressionResult) -> Self {
        let actual: Vec<(f64, f64)> = result
            .predictions
            .iter()
            .map(|p| (p.year as f64, p.actual))
            .collect();
        let fitted: Vec<(f64, f64)> = result
            .predictions
            .iter()
            .map(|p| (p.year as f64, p.predicted))
            .collect();

        let x_bounds = bounds(actual.iter().map(|p| p.0)).unwrap_or([0.0, 1.0]);
        let y_bounds = bounds(actual.iter().chain(&fitted).map(|p| p.1)).unwrap_or([0.0, 1.0]);

        Self {
            actual,
            fitted,
            x_bounds,
            y_bounds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Finite min/max of `values`; a single value is widened by ±0.5.
fn bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some([min, max])
    } else {
        Some([min - 0.5, max + 0.5])
    }
}

/// Widen `[min, max]` by `frac` of its span on each side.
pub fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
