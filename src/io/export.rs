//! Excel and CSV exports.
//!
//! Three workbooks are written:
//!
//! - the reconciled table (`Summary`), which is also the input of `popreg regress`
//! - the regression worksheet with `x²`, `y²`, `xy` and totals, plus the equation
//! - the per-year results with a native Excel line chart, plus the fit statistics

use std::path::Path;

use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet, XlsxError};

use crate::domain::{LABOR_HEADER, POPULATION_HEADER, ReconciledRow, RegressionResult, YEAR_HEADER};
use crate::error::DataError;
use crate::fit::coefficients_from_totals;

pub const SUMMARY_SHEET: &str = "Summary";
pub const EQUATION_SHEET: &str = "Persamaan Regresi";
pub const EQUATION_RESULT_SHEET: &str = "Hasil Regresi";
pub const RESULTS_SHEET: &str = "Data dan Hasil";
pub const INFO_SHEET: &str = "Info Regresi";

fn header_format() -> Format {
    Format::new().set_bold()
}

fn count_format() -> Format {
    Format::new().set_num_format("#,##0")
}

fn decimal_format() -> Format {
    Format::new().set_num_format("0.00")
}

fn write_headers(ws: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let bold = header_format();
    for (col, h) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *h, &bold)?;
        ws.set_column_width(col as u16, (h.chars().count() as f64 + 4.0).max(12.0))?;
    }
    Ok(())
}

/// Write the reconciled `(Tahun, X, Y)` table.
pub fn write_reconciled_xlsx(path: &Path, rows: &[ReconciledRow]) -> Result<(), DataError> {
    let mut workbook = Workbook::new();
    fill_reconciled(workbook.add_worksheet(), rows).map_err(|e| DataError::write(path, e))?;
    workbook.save(path).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote reconciled table to {}", path.display());
    Ok(())
}

fn fill_reconciled(ws: &mut Worksheet, rows: &[ReconciledRow]) -> Result<(), XlsxError> {
    ws.set_name(SUMMARY_SHEET)?;
    write_headers(ws, &[YEAR_HEADER, POPULATION_HEADER, LABOR_HEADER])?;
    let counts = count_format();
    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_number(row, 0, r.year)?;
        ws.write_number_with_format(row, 1, r.x, &counts)?;
        ws.write_number_with_format(row, 2, r.y, &counts)?;
    }
    Ok(())
}

/// Write the regression worksheet (sums table) and the resulting equation.
pub fn write_equation_xlsx(path: &Path, result: &RegressionResult) -> Result<(), DataError> {
    let mut workbook = Workbook::new();
    fill_sums(workbook.add_worksheet(), result).map_err(|e| DataError::write(path, e))?;
    fill_equation(workbook.add_worksheet(), result).map_err(|e| DataError::write(path, e))?;
    workbook.save(path).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote regression worksheet to {}", path.display());
    Ok(())
}

fn fill_sums(ws: &mut Worksheet, result: &RegressionResult) -> Result<(), XlsxError> {
    ws.set_name(EQUATION_SHEET)?;
    write_headers(ws, &[YEAR_HEADER, "x", "y", "x²", "y²", "xy"])?;
    let counts = count_format();
    for (i, s) in result.sums.rows.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_number(row, 0, s.year)?;
        for (col, v) in [s.x, s.y, s.x2, s.y2, s.xy].into_iter().enumerate() {
            ws.write_number_with_format(row, col as u16 + 1, v, &counts)?;
        }
    }

    let t = &result.sums.totals;
    let total_row = result.sums.rows.len() as u32 + 1;
    let bold_counts = count_format().set_bold();
    ws.write_string_with_format(total_row, 0, "Jumlah", &header_format())?;
    for (col, v) in [t.x, t.y, t.x2, t.y2, t.xy].into_iter().enumerate() {
        ws.write_number_with_format(total_row, col as u16 + 1, v, &bold_counts)?;
    }
    for col in 1..=5u16 {
        ws.set_column_width(col, 24)?;
    }
    Ok(())
}

fn fill_equation(ws: &mut Worksheet, result: &RegressionResult) -> Result<(), XlsxError> {
    ws.set_name(EQUATION_RESULT_SHEET)?;
    write_headers(ws, &["Keterangan", "Nilai"])?;

    // The worksheet form of the intercept; agrees with the fit up to rounding.
    let (a, b) = coefficients_from_totals(&result.sums.totals).unwrap_or((result.intercept, result.slope));
    let rows = [
        ("Konstanta (a)", format!("{a:.2}")),
        ("Koefisien (b)", format!("{b:.6}")),
        ("Persamaan Regresi", result.equation()),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, *label)?;
        ws.write_string(row, 1, value.as_str())?;
    }
    ws.set_column_width(1, 36)?;
    Ok(())
}

/// Write per-year results (with a line chart) and the fit statistics.
pub fn write_output_xlsx(path: &Path, result: &RegressionResult) -> Result<(), DataError> {
    let mut workbook = Workbook::new();
    fill_results(workbook.add_worksheet(), result).map_err(|e| DataError::write(path, e))?;
    fill_info(workbook.add_worksheet(), result).map_err(|e| DataError::write(path, e))?;
    workbook.save(path).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote regression output to {}", path.display());
    Ok(())
}

fn fill_results(ws: &mut Worksheet, result: &RegressionResult) -> Result<(), XlsxError> {
    ws.set_name(RESULTS_SHEET)?;
    write_headers(
        ws,
        &[
            YEAR_HEADER,
            POPULATION_HEADER,
            "Angkatan Kerja Aktual (Y)",
            "Angkatan Kerja Prediksi",
            "Selisih (Aktual - Prediksi)",
            "Persentase Error (%)",
        ],
    )?;

    let counts = count_format();
    let decimals = decimal_format();
    for (i, p) in result.predictions.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_number(row, 0, p.year)?;
        ws.write_number_with_format(row, 1, p.x, &counts)?;
        ws.write_number_with_format(row, 2, p.actual, &counts)?;
        ws.write_number_with_format(row, 3, p.predicted.round(), &counts)?;
        ws.write_number_with_format(row, 4, p.residual.round(), &counts)?;
        match p.error_pct {
            Some(e) => ws.write_number_with_format(row, 5, e, &decimals)?,
            None => ws.write_string(row, 5, "n/a")?,
        };
    }

    let n = result.predictions.len() as u32;
    if n > 0 {
        let mut chart = Chart::new(ChartType::Line);
        chart
            .add_series()
            .set_name("Data Aktual")
            .set_categories((RESULTS_SHEET, 1, 0, n, 0))
            .set_values((RESULTS_SHEET, 1, 2, n, 2));
        chart
            .add_series()
            .set_name("Regresi Linear")
            .set_categories((RESULTS_SHEET, 1, 0, n, 0))
            .set_values((RESULTS_SHEET, 1, 3, n, 3));
        chart
            .title()
            .set_name(&format!("{} (r² = {:.4})", result.equation(), result.determination));
        chart.x_axis().set_name(YEAR_HEADER);
        chart.y_axis().set_name("Jumlah Angkatan Kerja");
        // Anchored at H2, beside the table.
        ws.insert_chart(1, 7, &chart)?;
    }
    Ok(())
}

fn fill_info(ws: &mut Worksheet, result: &RegressionResult) -> Result<(), XlsxError> {
    ws.set_name(INFO_SHEET)?;
    write_headers(ws, &["Parameter", "Nilai"])?;
    let rows = [
        ("Intercept (a)", format!("{:.2}", result.intercept)),
        ("Slope (b)", format!("{:.6}", result.slope)),
        ("Koefisien Korelasi (r)", format!("{:.4}", result.correlation)),
        ("Koefisien Determinasi (r²)", format!("{:.4}", result.determination)),
        ("Persamaan Regresi", result.equation()),
        ("RMSE", format!("{:.2}", result.quality.rmse)),
        (
            "MAPE (%)",
            result.quality.mape.map(|m| format!("{m:.2}")).unwrap_or_else(|| "n/a".to_string()),
        ),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, *label)?;
        ws.write_string(row, 1, value.as_str())?;
    }
    ws.set_column_width(0, 30)?;
    ws.set_column_width(1, 36)?;
    Ok(())
}

/// Write per-year predictions to a CSV file.
pub fn write_predictions_csv(path: &Path, result: &RegressionResult) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DataError::write(path, e))?;

    writer
        .write_record(["year", "population", "labor_force", "predicted", "residual", "error_pct"])
        .map_err(|e| DataError::write(path, e))?;

    for p in &result.predictions {
        writer
            .write_record([
                p.year.to_string(),
                format!("{:.0}", p.x),
                format!("{:.0}", p.actual),
                format!("{:.4}", p.predicted),
                format!("{:.4}", p.residual),
                p.error_pct.map(|e| format!("{e:.4}")).unwrap_or_default(),
            ])
            .map_err(|e| DataError::write(path, e))?;
    }

    writer.flush().map_err(|e| DataError::write(path, e))?;
    log::info!("wrote predictions CSV to {}", path.display());
    Ok(())
}
