//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - actual labor force: `o`
//! - regression fit: `-` line through the fitted value of each year

use crate::domain::{RegressionResult, ResultFile};
use crate::plot::{ChartData, pad_range};

/// Render a plot for an in-memory regression result.
pub fn render_ascii_plot(result: &RegressionResult, width: usize, height: usize) -> String {
    render_plot(&ChartData::from_result(result), width, height)
}

/// Render a plot from a saved result JSON file.
pub fn render_ascii_plot_from_result_file(file: &ResultFile, width: usize, height: usize) -> String {
    let mut out = format!("{} | r²={:.4}\n", file.result.equation(), file.result.determination);
    out.push_str(&render_ascii_plot(&file.result, width, height));
    out
}

fn render_plot(data: &ChartData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let [t_min, t_max] = data.x_bounds;
    let (y_min, y_max) = pad_range(data.y_bounds[0], data.y_bounds[1], 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so the observations overlay it.
    draw_curve(&mut grid, &data.fitted, t_min, t_max, y_min, y_max);

    for &(t, y) in &data.actual {
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: years=[{t_min:.0}, {t_max:.0}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, Prediction, SumsTable, SumsTotals};

    fn result_with(predictions: Vec<Prediction>) -> RegressionResult {
        RegressionResult {
            intercept: 100.0,
            slope: 0.0,
            correlation: 0.0,
            determination: 0.0,
            predictions,
            sums: SumsTable {
                rows: Vec::new(),
                totals: SumsTotals::default(),
            },
            quality: FitQuality { sse: 0.0, rmse: 0.0, mape: None, n: 0 },
            cross_check: None,
        }
    }

    fn prediction(year: i32, actual: f64, predicted: f64) -> Prediction {
        Prediction {
            year,
            x: 1.0,
            actual,
            predicted,
            residual: actual - predicted,
            error_pct: None,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let result = result_with(vec![prediction(2020, 100.0, 100.0), prediction(2029, 110.0, 100.0)]);

        let txt = render_ascii_plot(&result, 10, 5);
        let expected = concat!(
            "Plot: years=[2020, 2029] | y=[99.50, 110.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_year_still_renders() {
        let result = result_with(vec![prediction(2022, 5.0, 5.0)]);
        let txt = render_ascii_plot(&result, 12, 6);
        assert_eq!(txt.lines().count(), 7);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('o').count(), 1);
    }
}
