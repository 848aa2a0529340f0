//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages without hidden state
//! - exported to JSON/Excel
//! - reloaded later for plotting

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default first year of the expected span.
pub const DEFAULT_START_YEAR: i32 = 2020;
/// Default last year of the expected span (inclusive).
pub const DEFAULT_END_YEAR: i32 = 2024;
/// Default name fragment identifying the city row in labor-force sheets.
pub const DEFAULT_ENTITY: &str = "Tangerang";

/// Column headers of the reconciled table (the contract between cleansing and regression).
pub const YEAR_HEADER: &str = "Tahun";
pub const POPULATION_HEADER: &str = "Jumlah Penduduk (X)";
pub const LABOR_HEADER: &str = "Jumlah Angkatan Kerja (Y)";

/// Which quantity a workbook describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Per-subdivision population counts, summed to a city total.
    Population,
    /// Labor-force counts per regency/city; one entity row is selected.
    LaborForce,
}

impl SeriesKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Population => "population",
            SeriesKind::LaborForce => "labor force",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single `(year, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Returns true for 4-digit calendar years.
pub fn is_calendar_year(year: i32) -> bool {
    (1000..=9999).contains(&year)
}

/// Ordered year → value mapping.
///
/// Construction goes through [`YearSeries::from_values`] (or the workbook
/// builder in `io::series`); once built the series is read-only. At most one
/// value is kept per year: a later insertion for the same year replaces the
/// earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    values: BTreeMap<i32, f64>,
}

impl YearSeries {
    /// Build a series from observations in insertion order (last write wins).
    pub fn from_values(values: impl IntoIterator<Item = YearValue>) -> Self {
        let mut map = BTreeMap::new();
        for v in values {
            map.insert(v.year, v.value);
        }
        Self { values: map }
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }
}

/// One aligned observation: population `x` and labor force `y` for a year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub year: i32,
    pub x: f64,
    pub y: f64,
}

/// Per-year fitted output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub year: i32,
    pub x: f64,
    pub actual: f64,
    pub predicted: f64,
    pub residual: f64,
    /// `|actual - predicted| / actual * 100`; `None` when `actual == 0`.
    pub error_pct: Option<f64>,
}

/// One row of the regression worksheet (`x`, `y`, `x²`, `y²`, `xy`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumsRow {
    pub year: i32,
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
    pub xy: f64,
}

/// Column totals of the regression worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SumsTotals {
    pub n: usize,
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
    pub xy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumsTable {
    pub rows: Vec<SumsRow>,
    pub totals: SumsTotals,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// Mean absolute percentage error over rows with a defined error%.
    pub mape: Option<f64>,
    pub n: usize,
}

/// Closed-form coefficients compared against an SVD least-squares solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheck {
    pub intercept: f64,
    pub slope: f64,
    /// Largest relative difference between the two solutions.
    pub rel_delta: f64,
}

/// Output of the regression stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub intercept: f64,
    pub slope: f64,
    pub correlation: f64,
    pub determination: f64,
    pub predictions: Vec<Prediction>,
    pub sums: SumsTable,
    pub quality: FitQuality,
    /// Absent when the reference solve could not be computed.
    pub cross_check: Option<CrossCheck>,
}

impl RegressionResult {
    /// Share of y-variance explained, in percent.
    pub fn accuracy_pct(&self) -> f64 {
        self.determination * 100.0
    }

    /// `Y = a + bX` with the sign folded into the operator.
    pub fn equation(&self) -> String {
        let (op, b) = if self.slope < 0.0 {
            ('-', -self.slope)
        } else {
            ('+', self.slope)
        };
        format!("Y = {:.2} {op} {:.6}X", self.intercept, b)
    }

    pub fn years(&self) -> Vec<i32> {
        self.predictions.iter().map(|p| p.year).collect()
    }
}

/// Where the reconciled rows of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Extracted from the two source workbooks.
    Workbooks,
    /// Built-in dataset used after a source produced no values.
    Fallback,
    /// Read back from a previously written reconciled table.
    ReconciledTable,
}

impl DataOrigin {
    pub fn display_name(self) -> &'static str {
        match self {
            DataOrigin::Workbooks => "source workbooks",
            DataOrigin::Fallback => "built-in fallback dataset",
            DataOrigin::ReconciledTable => "reconciled table",
        }
    }
}

/// A saved regression result (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: NaiveDateTime,
    pub origin: DataOrigin,
    pub expected_years: Vec<i32>,
    pub missing_years: Vec<i32>,
    pub result: RegressionResult,
}

/// Output locations for a run.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub dir: PathBuf,
}

impl OutputPaths {
    pub fn reconciled_xlsx(&self) -> PathBuf {
        self.dir.join("data_cleansing.xlsx")
    }

    pub fn equation_xlsx(&self) -> PathBuf {
        self.dir.join("regression_equation.xlsx")
    }

    pub fn output_xlsx(&self) -> PathBuf {
        self.dir.join("regression_output.xlsx")
    }

    pub fn chart_svg(&self) -> PathBuf {
        self.dir.join("regression_chart.svg")
    }

    pub fn report_pdf(&self) -> PathBuf {
        self.dir.join("regression_report.pdf")
    }

    pub fn result_json(&self) -> PathBuf {
        self.dir.join("regression_result.json")
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub population_path: Option<PathBuf>,
    pub labor_path: Option<PathBuf>,
    /// Reconciled table to regress directly (skips extraction).
    pub reconciled_path: Option<PathBuf>,

    pub start_year: i32,
    pub end_year: i32,
    pub entity: String,

    /// Use the built-in dataset when a source yields no values.
    pub fallback: bool,

    pub outputs: OutputPaths,
    pub export_csv: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl PipelineConfig {
    /// Inclusive span of expected years.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Sheet labels, one per expected year.
    pub fn sheet_names(&self) -> Vec<String> {
        self.years().map(|y| y.to_string()).collect()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            population_path: None,
            labor_path: None,
            reconciled_path: None,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            entity: DEFAULT_ENTITY.to_string(),
            fallback: true,
            outputs: OutputPaths { dir: PathBuf::from(".") },
            export_csv: None,
            plot: true,
            plot_width: 72,
            plot_height: 20,
        }
    }
}
