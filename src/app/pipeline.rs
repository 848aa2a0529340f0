//! Shared pipeline logic used by the `run`, `clean` and `regress` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! workbooks -> per-year series -> reconciliation -> fit -> reports
//!
//! The commands then only decide which stages to run and what to print.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::data::fallback_series;
use crate::domain::{DataOrigin, PipelineConfig, ReconciledRow, RegressionResult, SeriesKind, YearSeries};
use crate::error::{AppError, DataError, SeriesError};
use crate::fit::fit_regression;
use crate::io::{
    ExcelWorkbook, SheetExtractor, SheetWarning, build_series, read_reconciled_table, result_file,
    write_equation_xlsx, write_output_xlsx, write_predictions_csv, write_reconciled_xlsx, write_result_json,
};
use crate::plot::write_chart_svg;
use crate::reconcile::{Reconciliation, reconcile};
use crate::report::write_report_pdf;

/// Outputs of the extraction and reconciliation stages.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub reconciliation: Reconciliation,
    pub expected_years: BTreeSet<i32>,
    /// Sheets skipped in either source.
    pub warnings: Vec<SheetWarning>,
    pub origin: DataOrigin,
    pub written: Vec<PathBuf>,
}

impl CleanOutput {
    pub fn rows(&self) -> &[ReconciledRow] {
        &self.reconciliation.rows
    }
}

/// All computed outputs of a `popreg run` or `popreg regress`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub clean: CleanOutput,
    pub result: RegressionResult,
}

impl RunOutput {
    /// Every file written by the run, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.clean.written
    }
}

/// Extract both series, reconcile them and write the reconciled table.
pub fn run_clean(config: &PipelineConfig) -> Result<CleanOutput, AppError> {
    if config.start_year > config.end_year {
        return Err(AppError::new(
            2,
            format!(
                "Invalid year span: start year {} is after end year {}.",
                config.start_year, config.end_year
            ),
        ));
    }
    let expected_years: BTreeSet<i32> = config.years().collect();
    let sheet_names = config.sheet_names();
    let extractor = SheetExtractor::new(&config.entity);
    let mut warnings = Vec::new();

    let population = read_series(
        config.population_path.as_deref(),
        SeriesKind::Population,
        &sheet_names,
        &extractor,
        &mut warnings,
    )?;
    let labor = read_series(
        config.labor_path.as_deref(),
        SeriesKind::LaborForce,
        &sheet_names,
        &extractor,
        &mut warnings,
    )?;

    // A series with no values at all makes the other one meaningless on its
    // own, so the fallback replaces both.
    let (population, labor, origin) = match (population, labor) {
        (Ok(p), Ok(l)) => (p, l, DataOrigin::Workbooks),
        (p, l) => {
            let err = p.err().or(l.err()).map(|e| e.to_string()).unwrap_or_default();
            if !config.fallback {
                return Err(AppError::new(3, format!("{err} (fallback disabled)")));
            }
            let population = fallback_series(SeriesKind::Population, &expected_years);
            let labor = fallback_series(SeriesKind::LaborForce, &expected_years);
            if population.is_empty() || labor.is_empty() {
                return Err(AppError::new(
                    3,
                    format!(
                        "{err}; the built-in dataset has no values for {}-{}",
                        config.start_year, config.end_year
                    ),
                ));
            }
            log::warn!("{err}; using the built-in dataset for both series");
            (population, labor, DataOrigin::Fallback)
        }
    };

    let reconciliation = reconcile(&population, &labor, &expected_years);

    ensure_dir(&config.outputs.dir)?;
    let path = config.outputs.reconciled_xlsx();
    write_reconciled_xlsx(&path, &reconciliation.rows)?;

    Ok(CleanOutput {
        reconciliation,
        expected_years,
        warnings,
        origin,
        written: vec![path],
    })
}

/// Execute the full pipeline: clean, then fit and report.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let clean = run_clean(config)?;
    regress(config, clean)
}

/// Fit from a reconciled table written by an earlier run.
pub fn run_regress_from_table(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let path = config
        .reconciled_path
        .as_deref()
        .ok_or_else(|| AppError::new(2, "No reconciled table given (--input)."))?;
    let rows = read_reconciled_table(path)?;
    let expected_years = rows.iter().map(|r| r.year).collect();

    ensure_dir(&config.outputs.dir)?;
    let clean = CleanOutput {
        reconciliation: Reconciliation {
            rows,
            missing_years: BTreeSet::new(),
            dropped: Vec::new(),
        },
        expected_years,
        warnings: Vec::new(),
        origin: DataOrigin::ReconciledTable,
        written: Vec::new(),
    };
    regress(config, clean)
}

fn regress(config: &PipelineConfig, mut clean: CleanOutput) -> Result<RunOutput, AppError> {
    let result = fit_regression(clean.rows())?;
    let outputs = &config.outputs;

    let path = outputs.equation_xlsx();
    write_equation_xlsx(&path, &result)?;
    clean.written.push(path);

    let path = outputs.output_xlsx();
    write_output_xlsx(&path, &result)?;
    clean.written.push(path);

    let path = outputs.chart_svg();
    write_chart_svg(&path, &result)?;
    clean.written.push(path);

    let path = outputs.report_pdf();
    write_report_pdf(&path, &result, clean.origin)?;
    clean.written.push(path);

    let path = outputs.result_json();
    let file = result_file(
        &result,
        clean.origin,
        clean.expected_years.iter().copied().collect(),
        clean.reconciliation.missing_years.iter().copied().collect(),
    );
    write_result_json(&path, &file)?;
    clean.written.push(path);

    if let Some(path) = &config.export_csv {
        write_predictions_csv(path, &result)?;
        clean.written.push(path.clone());
    }

    Ok(RunOutput { clean, result })
}

/// Open a source workbook and build its series.
///
/// Opening failures are fatal. A source where every sheet failed comes back as
/// the inner `Err` so the caller can decide on the fallback; its skipped sheets
/// are still added to `warnings`.
fn read_series(
    path: Option<&Path>,
    kind: SeriesKind,
    sheet_names: &[String],
    extractor: &SheetExtractor,
    warnings: &mut Vec<SheetWarning>,
) -> Result<Result<YearSeries, SeriesError>, AppError> {
    let path = path.ok_or_else(|| AppError::new(2, format!("No {kind} workbook given.")))?;
    let mut workbook = ExcelWorkbook::open(path)?;
    log::info!("[{kind}] reading {}", path.display());

    match build_series(&mut workbook, sheet_names, kind, extractor) {
        Ok(build) => {
            warnings.extend(build.warnings);
            Ok(Ok(build.series))
        }
        Err(e) => {
            warnings.extend_from_slice(e.warnings());
            Ok(Err(e))
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), DataError> {
    std::fs::create_dir_all(dir).map_err(|e| DataError::write(dir, e))
}
