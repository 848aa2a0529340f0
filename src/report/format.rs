//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the extraction/fitting code stays clean and testable
//! - output changes are localized

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::domain::{DataOrigin, LABOR_HEADER, POPULATION_HEADER, ReconciledRow, RegressionResult, YEAR_HEADER};
use crate::fit::CROSS_CHECK_TOLERANCE;
use crate::io::SheetWarning;
use crate::report::DatasetStats;

/// Format the reconciled `(Tahun, X, Y)` table.
pub fn format_reconciled_table(rows: &[ReconciledRow]) -> String {
    let mut out = String::new();
    out.push_str("Reconciled data:\n");
    out.push_str(&format!(
        "{:<6} {:>22} {:>26}\n",
        YEAR_HEADER, POPULATION_HEADER, LABOR_HEADER
    ));
    out.push_str(&format!("{:-<6} {:-<22} {:-<26}\n", "", "", ""));
    for r in rows {
        out.push_str(&format!(
            "{:<6} {:>22} {:>26}\n",
            r.year,
            fmt_count(r.x),
            fmt_count(r.y)
        ));
    }
    out
}

/// Format dataset statistics.
pub fn format_dataset_stats(stats: &DatasetStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Data: n={} | years=[{}, {}]\n",
        stats.n, stats.year_min, stats.year_max
    ));
    out.push_str(&format!(
        "X (population):  [{}, {}] mean={}\n",
        fmt_count(stats.x_min),
        fmt_count(stats.x_max),
        fmt_count(stats.mean_x)
    ));
    out.push_str(&format!(
        "Y (labor force): [{}, {}] mean={}\n",
        fmt_count(stats.y_min),
        fmt_count(stats.y_max),
        fmt_count(stats.mean_y)
    ));
    out
}

/// Format the regression summary (equation, correlation, quality).
pub fn format_regression_summary(result: &RegressionResult, origin: DataOrigin) -> String {
    let mut out = String::new();

    out.push_str("=== popreg - Population vs Labor Force Regression ===\n");
    out.push_str(&format!("Source: {}\n", origin.display_name()));
    out.push_str(&format!("Equation: {}\n", result.equation()));
    out.push_str(&format!(
        "- intercept (a): {:.2}\n- slope (b):     {:.6}\n",
        result.intercept, result.slope
    ));
    out.push_str(&format!(
        "- r = {:.4} | r² = {:.4} | accuracy = {:.2}%\n",
        result.correlation,
        result.determination,
        result.accuracy_pct()
    ));
    out.push_str(&format!(
        "- SSE={:.3e} RMSE={:.2} MAPE={}\n",
        result.quality.sse,
        result.quality.rmse,
        fmt_pct(result.quality.mape)
    ));
    match &result.cross_check {
        Some(check) => {
            let status = if check.rel_delta > CROSS_CHECK_TOLERANCE {
                "MISMATCH"
            } else {
                "ok"
            };
            out.push_str(&format!(
                "- SVD cross-check: a={:.2} b={:.6} delta={:.1e} ({status})\n",
                check.intercept, check.slope, check.rel_delta
            ));
        }
        None => out.push_str("- SVD cross-check: unavailable\n"),
    }

    out
}

/// Format the per-year prediction table.
pub fn format_prediction_table(result: &RegressionResult) -> String {
    let mut out = String::new();
    out.push_str("Predictions:\n");
    out.push_str(&format!(
        "{:<6} {:>14} {:>14} {:>14} {:>14} {:>8}\n",
        "year", "population", "actual", "predicted", "residual", "error%"
    ));
    out.push_str(&format!(
        "{:-<6} {:-<14} {:-<14} {:-<14} {:-<14} {:-<8}\n",
        "", "", "", "", "", ""
    ));
    for p in &result.predictions {
        out.push_str(&format!(
            "{:<6} {:>14} {:>14} {:>14} {:>14} {:>8}\n",
            p.year,
            fmt_count(p.x),
            fmt_count(p.actual),
            fmt_count(p.predicted),
            fmt_count(p.residual),
            fmt_pct(p.error_pct)
        ));
    }
    out
}

/// Format skipped sheets and expected years without data. Empty when clean.
pub fn format_diagnostics(warnings: &[SheetWarning], missing_years: &BTreeSet<i32>) -> String {
    let mut out = String::new();
    if warnings.is_empty() && missing_years.is_empty() {
        return out;
    }
    out.push_str("Diagnostics:\n");
    for w in warnings {
        out.push_str(&format!("- skipped {w}\n"));
    }
    if !missing_years.is_empty() {
        let years: Vec<String> = missing_years.iter().map(|y| y.to_string()).collect();
        out.push_str(&format!("- missing years: {}\n", years.join(", ")));
    }
    out
}

/// Format the list of files written by a run.
pub fn format_outputs(paths: &[PathBuf]) -> String {
    let mut out = String::from("Outputs:\n");
    for p in paths {
        out.push_str(&format!("- {}\n", p.display()));
    }
    out
}

/// Round to an integer and group thousands: `1742604.4` -> `1,742,604`.
pub fn fmt_count(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let rounded = v.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::domain::SeriesKind;
    use crate::fit::fit_regression;

    #[test]
    fn counts_are_grouped() {
        assert_eq!(fmt_count(1742604.4), "1,742,604");
        assert_eq!(fmt_count(-1234.6), "-1,235");
        assert_eq!(fmt_count(999.0), "999");
        assert_eq!(fmt_count(0.2), "0");
    }

    #[test]
    fn reconciled_table_lists_rows_in_order() {
        let rows = vec![
            ReconciledRow { year: 2020, x: 1742604.0, y: 5552172.0 },
            ReconciledRow { year: 2021, x: 1771092.0, y: 5698344.0 },
        ];
        let txt = format_reconciled_table(&rows);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains(POPULATION_HEADER));
        assert!(lines[3].starts_with("2020"));
        assert!(lines[3].ends_with("5,552,172"));
        assert!(lines[4].contains("1,771,092"));
    }

    #[test]
    fn zero_actual_prints_na() {
        let rows: Vec<ReconciledRow> = [(2020, 1.0, 0.0), (2021, 2.0, 4.0), (2022, 3.0, 7.0)]
            .into_iter()
            .map(|(year, x, y)| ReconciledRow { year, x, y })
            .collect();
        let result = fit_regression(&rows).unwrap();
        let txt = format_prediction_table(&result);
        assert!(txt.lines().nth(3).unwrap_or_default().ends_with("n/a"));

        let summary = format_regression_summary(&result, DataOrigin::Workbooks);
        assert!(summary.contains(&result.equation()));
        assert!(summary.contains("source workbooks"));
    }

    #[test]
    fn diagnostics_name_sheet_and_years() {
        assert!(format_diagnostics(&[], &BTreeSet::new()).is_empty());

        let warnings = vec![SheetWarning {
            kind: SeriesKind::LaborForce,
            sheet: "2023".to_string(),
            error: ExtractError::MissingEntity {
                entity: "tangerang".to_string(),
            },
        }];
        let txt = format_diagnostics(&warnings, &[2023, 2024].into_iter().collect());
        assert!(txt.contains("[labor force] sheet 2023"));
        assert!(txt.contains("missing years: 2023, 2024"));
    }
}
