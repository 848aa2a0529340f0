//! SVG chart export (plotters, SVG backend).
//!
//! Same content as the terminal plot: actual labor force as markers, the
//! regression fit as a line, years on the x axis. The caption carries the
//! equation and r².

use std::path::Path;

use plotters::prelude::*;

use crate::domain::RegressionResult;
use crate::error::DataError;
use crate::plot::{ChartData, pad_range};

pub const SVG_SIZE: (u32, u32) = (1000, 600);

/// Write the actual-vs-fitted chart to `path`.
pub fn write_chart_svg(path: &Path, result: &RegressionResult) -> Result<(), DataError> {
    let data = ChartData::from_result(result);
    let caption = format!("{} (r² = {:.4})", result.equation(), result.determination);

    draw_chart(SVGBackend::new(path, SVG_SIZE), &data, &caption).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote chart to {}", path.display());
    Ok(())
}

/// Render the chart into an SVG string.
pub fn render_chart_svg(result: &RegressionResult) -> Result<String, String> {
    let data = ChartData::from_result(result);
    let caption = format!("{} (r² = {:.4})", result.equation(), result.determination);

    let mut svg = String::new();
    draw_chart(SVGBackend::with_string(&mut svg, SVG_SIZE), &data, &caption)?;
    Ok(svg)
}

fn draw_chart(backend: SVGBackend<'_>, data: &ChartData, caption: &str) -> Result<(), String> {
    let root = backend.into_drawing_area();
    root.fill(&WHITE).map_err(|e| format!("SVG render error: {e}"))?;

    let [x0, x1] = data.x_bounds;
    let (x0, x1) = (x0 - 0.5, x1 + 0.5);
    let (y0, y1) = pad_range(data.y_bounds[0], data.y_bounds[1], 0.1);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| format!("Chart build error: {e}"))?;

    chart
        .configure_mesh()
        .x_desc("Tahun")
        .y_desc("Jumlah Angkatan Kerja")
        .x_labels(data.actual.len().max(2))
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
        .map_err(|e| format!("Grid draw error: {e}"))?;

    let actual_color = RGBColor(31, 119, 180);
    let fitted_color = RGBColor(214, 39, 40);

    chart
        .draw_series(LineSeries::new(data.fitted.iter().copied(), fitted_color.stroke_width(2)))
        .map_err(|e| format!("Line series error: {e}"))?
        .label("Regresi Linear")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fitted_color));

    chart
        .draw_series(
            data.actual
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, actual_color.filled())),
        )
        .map_err(|e| format!("Point series error: {e}"))?
        .label("Data Aktual")
        .legend(move |(x, y)| Circle::new((x + 10, y), 5, actual_color.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| format!("Legend draw error: {e}"))?;

    root.present().map_err(|e| format!("Present error: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReconciledRow;
    use crate::fit::fit_regression;

    #[test]
    fn svg_contains_caption_and_markers() {
        let rows: Vec<ReconciledRow> = [(2020, 1.0, 2.0), (2021, 2.0, 4.5), (2022, 3.0, 5.5)]
            .into_iter()
            .map(|(year, x, y)| ReconciledRow { year, x, y })
            .collect();
        let result = fit_regression(&rows).unwrap();
        let svg = render_chart_svg(&result).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("circle"));
        assert!(svg.contains("Data Aktual"));
    }
}
