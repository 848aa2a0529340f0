//! One-page PDF report (printpdf, builtin Helvetica).
//!
//! Layout on an A4 page, top to bottom: title, chart (drawn with vector
//! lines), regression statistics, per-year prediction table.
//!
//! Builtin fonts only cover WinAnsi text, so labels stay ASCII.

use std::path::Path;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::domain::{DataOrigin, RegressionResult};
use crate::error::DataError;
use crate::plot::{ChartData, pad_range};
use crate::report::format::fmt_count;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;

/// Chart frame on the page, in mm.
const CHART_LEFT: f32 = 35.0;
const CHART_RIGHT: f32 = 185.0;
const CHART_BOTTOM: f32 = 160.0;
const CHART_TOP: f32 = 255.0;

/// Build the report and return the PDF bytes.
pub fn render_report_pdf(result: &RegressionResult, origin: DataOrigin) -> Result<Vec<u8>, String> {
    let (doc, page, layer) = PdfDocument::new(
        "Population vs Labor Force Regression",
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| format!("Font error: {e}"))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| format!("Font error: {e}"))?;

    layer.use_text(
        "Regresi Linear: Jumlah Penduduk (X) vs Angkatan Kerja (Y)",
        15.0,
        Mm(20.0),
        Mm(280.0),
        &bold,
    );
    layer.use_text(
        format!("Source: {}", origin.display_name()),
        10.0,
        Mm(20.0),
        Mm(272.0),
        &regular,
    );

    draw_chart(&layer, &regular, &ChartData::from_result(result));

    let mut y = 140.0;
    let stats = [
        format!("Equation: {}", result.equation()),
        format!(
            "r = {:.4}   r-squared = {:.4}   accuracy = {:.2}%",
            result.correlation,
            result.determination,
            result.accuracy_pct()
        ),
        format!(
            "RMSE = {:.2}   MAPE = {}",
            result.quality.rmse,
            result
                .quality
                .mape
                .map(|m| format!("{m:.2}%"))
                .unwrap_or_else(|| "n/a".to_string())
        ),
    ];
    for line in stats {
        layer.use_text(line, 11.0, Mm(20.0), Mm(y), &regular);
        y -= 7.0;
    }

    y -= 6.0;
    let columns = [20.0, 45.0, 80.0, 115.0, 150.0, 180.0];
    let header = ["Tahun", "Penduduk", "Aktual", "Prediksi", "Selisih", "Error %"];
    for (x, label) in columns.iter().zip(header) {
        layer.use_text(label, 10.0, Mm(*x), Mm(y), &bold);
    }
    y -= 2.0;
    stroke(&layer, &[(20.0, y), (195.0, y)], (0.0, 0.0, 0.0), 0.5);
    y -= 6.0;

    for p in &result.predictions {
        let cells = [
            p.year.to_string(),
            fmt_count(p.x),
            fmt_count(p.actual),
            fmt_count(p.predicted),
            fmt_count(p.residual),
            p.error_pct.map(|e| format!("{e:.2}")).unwrap_or_else(|| "n/a".to_string()),
        ];
        for (x, cell) in columns.iter().zip(cells) {
            layer.use_text(cell, 10.0, Mm(*x), Mm(y), &regular);
        }
        y -= 6.0;
        if y < 15.0 {
            log::warn!("PDF table truncated after year {}", p.year);
            break;
        }
    }

    doc.save_to_bytes().map_err(|e| format!("PDF save error: {e}"))
}

/// Write the PDF report to `path`.
pub fn write_report_pdf(path: &Path, result: &RegressionResult, origin: DataOrigin) -> Result<(), DataError> {
    let bytes = render_report_pdf(result, origin).map_err(|e| DataError::write(path, e))?;
    std::fs::write(path, bytes).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote PDF report to {}", path.display());
    Ok(())
}

fn draw_chart(layer: &PdfLayerReference, font: &IndirectFontRef, data: &ChartData) {
    // Frame.
    stroke(
        layer,
        &[
            (CHART_LEFT, CHART_BOTTOM),
            (CHART_RIGHT, CHART_BOTTOM),
            (CHART_RIGHT, CHART_TOP),
            (CHART_LEFT, CHART_TOP),
            (CHART_LEFT, CHART_BOTTOM),
        ],
        (0.0, 0.0, 0.0),
        0.6,
    );
    if data.is_empty() {
        return;
    }

    let [x0, x1] = data.x_bounds;
    let (x0, x1) = (x0 - 0.5, x1 + 0.5);
    let (y0, y1) = pad_range(data.y_bounds[0], data.y_bounds[1], 0.1);
    let to_page = |(x, y): (f64, f64)| -> (f32, f32) {
        let u = ((x - x0) / (x1 - x0)) as f32;
        let v = ((y - y0) / (y1 - y0)) as f32;
        (
            CHART_LEFT + u * (CHART_RIGHT - CHART_LEFT),
            CHART_BOTTOM + v * (CHART_TOP - CHART_BOTTOM),
        )
    };

    // Year ticks.
    for &(year, _) in &data.actual {
        let (px, _) = to_page((year, y0));
        stroke(layer, &[(px, CHART_BOTTOM), (px, CHART_BOTTOM - 1.5)], (0.0, 0.0, 0.0), 0.4);
        layer.use_text(format!("{year:.0}"), 8.0, Mm(px - 3.5), Mm(CHART_BOTTOM - 5.5), font);
    }
    // Y labels at the padded bounds and the midpoint.
    for value in [y0, (y0 + y1) / 2.0, y1] {
        let (_, py) = to_page((x0, value));
        layer.use_text(fmt_count(value), 8.0, Mm(CHART_LEFT - 22.0), Mm(py - 1.0), font);
    }
    layer.use_text("Tahun", 9.0, Mm((CHART_LEFT + CHART_RIGHT) / 2.0 - 5.0), Mm(CHART_BOTTOM - 11.0), font);

    // Fitted line in red, actual values as blue crosses.
    let fitted: Vec<(f32, f32)> = data.fitted.iter().map(|&p| to_page(p)).collect();
    stroke(layer, &fitted, (0.84, 0.15, 0.16), 1.2);
    for &p in &data.actual {
        let (px, py) = to_page(p);
        let blue = (0.12, 0.47, 0.71);
        stroke(layer, &[(px - 1.5, py - 1.5), (px + 1.5, py + 1.5)], blue, 1.0);
        stroke(layer, &[(px - 1.5, py + 1.5), (px + 1.5, py - 1.5)], blue, 1.0);
    }

    // Legend.
    let ly = CHART_TOP - 6.0;
    stroke(layer, &[(CHART_LEFT + 4.0, ly), (CHART_LEFT + 12.0, ly)], (0.84, 0.15, 0.16), 1.2);
    layer.use_text("Regresi Linear", 8.0, Mm(CHART_LEFT + 14.0), Mm(ly - 1.0), font);
    let (lx, ly) = (CHART_LEFT + 8.0, ly - 6.0);
    stroke(layer, &[(lx - 1.5, ly - 1.5), (lx + 1.5, ly + 1.5)], (0.12, 0.47, 0.71), 1.0);
    stroke(layer, &[(lx - 1.5, ly + 1.5), (lx + 1.5, ly - 1.5)], (0.12, 0.47, 0.71), 1.0);
    layer.use_text("Data Aktual", 8.0, Mm(CHART_LEFT + 14.0), Mm(ly - 1.0), font);
}

/// Stroke an open polyline through `points` (mm).
fn stroke(layer: &PdfLayerReference, points: &[(f32, f32)], rgb: (f32, f32, f32), thickness: f32) {
    if points.len() < 2 {
        return;
    }
    layer.set_outline_color(Color::Rgb(Rgb::new(rgb.0, rgb.1, rgb.2, None)));
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: points
            .iter()
            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect(),
        is_closed: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReconciledRow;
    use crate::fit::fit_regression;

    #[test]
    fn renders_a_pdf_document() {
        let rows: Vec<ReconciledRow> = [(2020, 10.0, 21.0), (2021, 20.0, 39.0), (2022, 30.0, 62.0)]
            .into_iter()
            .map(|(year, x, y)| ReconciledRow { year, x, y })
            .collect();
        let result = fit_regression(&rows).unwrap();
        let bytes = render_report_pdf(&result, DataOrigin::Fallback).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
