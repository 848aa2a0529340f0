//! End-to-end runs against real workbooks written into temp directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use popreg::app::pipeline::{run_clean, run_pipeline, run_regress_from_table};
use popreg::domain::{DataOrigin, OutputPaths, PipelineConfig};
use popreg::io::{read_reconciled_table, read_result_json};
use popreg::report::format_diagnostics;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const YEARS: [i32; 5] = [2020, 2021, 2022, 2023, 2024];
const POPULATION: [f64; 5] = [1742604.0, 1771092.0, 1834962.0, 1912679.0, 1927815.0];
const LABOR: [f64; 5] = [5552172.0, 5698344.0, 5940618.0, 5516656.0, 5797923.0];

fn rel(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}

/// One sheet per year; two districts whose counts sum to the city total.
/// The header sits below two blank rows.
fn write_population(path: &Path, years: &[i32], totals: &[f64]) {
    let mut wb = Workbook::new();
    for (year, total) in years.iter().zip(totals) {
        let ws = wb.add_worksheet();
        ws.set_name(year.to_string()).unwrap();
        ws.write_string(2, 0, "Kecamatan").unwrap();
        ws.write_string(2, 1, "Jumlah Penduduk").unwrap();
        let first = (total / 2.0).floor();
        ws.write_string(3, 0, "Ciledug").unwrap();
        ws.write_number(3, 1, first).unwrap();
        ws.write_string(4, 0, "Karawaci").unwrap();
        ws.write_number(4, 1, total - first).unwrap();
    }
    wb.save(path).unwrap();
}

/// One sheet per year; one row per city, the target city in the middle.
fn write_labor(path: &Path, years: &[i32], values: &[f64], entity: &str) {
    let mut wb = Workbook::new();
    for (year, value) in years.iter().zip(values) {
        let ws = wb.add_worksheet();
        ws.set_name(year.to_string()).unwrap();
        ws.write_string(0, 0, "Kabupaten/Kota").unwrap();
        ws.write_string(0, 1, "Jumlah Angkatan Kerja").unwrap();
        ws.write_string(1, 0, "Kota Serang").unwrap();
        ws.write_number(1, 1, 330000.0).unwrap();
        ws.write_string(2, 0, entity).unwrap();
        ws.write_number(2, 1, *value).unwrap();
        ws.write_string(3, 0, "Kota Cilegon").unwrap();
        ws.write_number(3, 1, 210000.0).unwrap();
    }
    wb.save(path).unwrap();
}

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        population_path: Some(dir.path().join("penduduk.xlsx")),
        labor_path: Some(dir.path().join("angkatan_kerja.xlsx")),
        outputs: OutputPaths {
            dir: dir.path().join("out"),
        },
        plot: false,
        ..PipelineConfig::default()
    }
}

fn write_sources(dir: &TempDir) {
    write_population(&dir.path().join("penduduk.xlsx"), &YEARS, &POPULATION);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &YEARS, &LABOR, "Kota Tangerang");
}

#[test]
fn full_run_reproduces_reference_fit_and_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(&dir);
    let mut config = config(&dir);
    config.export_csv = Some(dir.path().join("predictions.csv"));

    let run = run_pipeline(&config).unwrap();

    assert_eq!(run.clean.origin, DataOrigin::Workbooks);
    assert!(run.clean.warnings.is_empty());
    assert!(run.clean.reconciliation.missing_years.is_empty());
    assert_eq!(run.clean.rows()[0].x, POPULATION[0]);
    assert_eq!(run.clean.rows()[4].y, LABOR[4]);

    assert!(rel(run.result.intercept, 5121647.212733766) < 1e-6);
    assert!(rel(run.result.slope, 0.31531494269886584) < 1e-6);
    assert!(rel(run.result.correlation, 0.14838923595674663) < 1e-6);

    let written: Vec<PathBuf> = run.written().to_vec();
    assert_eq!(written.len(), 7);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
    }

    let saved = read_result_json(&config.outputs.result_json()).unwrap();
    assert_eq!(saved.origin, DataOrigin::Workbooks);
    assert_eq!(saved.expected_years, YEARS.to_vec());
    assert_eq!(saved.result.years(), YEARS.to_vec());

    let table = read_reconciled_table(&config.outputs.reconciled_xlsx()).unwrap();
    assert_eq!(table, run.clean.rows());

    let csv = std::fs::read_to_string(dir.path().join("predictions.csv")).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.starts_with("year,population,labor_force"));
}

#[test]
fn missing_labor_sheet_drops_that_year() {
    let dir = tempfile::tempdir().unwrap();
    write_population(&dir.path().join("penduduk.xlsx"), &YEARS, &POPULATION);
    let keep = [0, 1, 2, 4];
    write_labor(
        &dir.path().join("angkatan_kerja.xlsx"),
        &keep.map(|i| YEARS[i]),
        &keep.map(|i| LABOR[i]),
        "Kota Tangerang",
    );

    let clean = run_clean(&config(&dir)).unwrap();

    let years: Vec<i32> = clean.rows().iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2020, 2021, 2022, 2024]);
    assert_eq!(clean.reconciliation.missing_years, BTreeSet::from([2023]));
    assert_eq!(clean.warnings.len(), 1);
    assert_eq!(clean.warnings[0].sheet, "2023");
}

#[test]
fn entity_absent_everywhere_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_population(&dir.path().join("penduduk.xlsx"), &YEARS, &POPULATION);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &YEARS, &LABOR, "Kota Bekasi");

    let run = run_pipeline(&config(&dir)).unwrap();
    assert_eq!(run.clean.origin, DataOrigin::Fallback);
    assert_eq!(run.clean.rows().len(), 5);
    assert!(rel(run.result.intercept, 5121647.212733766) < 1e-6);

    // The reasons the labor-force source came up empty are kept.
    let skipped: Vec<&str> = run.clean.warnings.iter().map(|w| w.sheet.as_str()).collect();
    assert_eq!(skipped, vec!["2020", "2021", "2022", "2023", "2024"]);
    let diagnostics = format_diagnostics(&run.clean.warnings, &run.clean.reconciliation.missing_years);
    assert!(diagnostics.contains("[labor force] sheet 2022"));
}

#[test]
fn fallback_keeps_to_the_configured_span() {
    let dir = tempfile::tempdir().unwrap();
    let years = [2022, 2023, 2024, 2025, 2026];
    write_population(&dir.path().join("penduduk.xlsx"), &years, &POPULATION);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &years, &LABOR, "Kota Bekasi");

    let config = PipelineConfig {
        start_year: 2022,
        end_year: 2026,
        ..config(&dir)
    };
    let clean = run_clean(&config).unwrap();

    assert_eq!(clean.origin, DataOrigin::Fallback);
    let rows: Vec<i32> = clean.rows().iter().map(|r| r.year).collect();
    assert_eq!(rows, vec![2022, 2023, 2024]);
    assert_eq!(clean.reconciliation.missing_years, BTreeSet::from([2025, 2026]));
    assert!(rows.iter().all(|y| clean.expected_years.contains(y)));
}

#[test]
fn fallback_without_overlapping_years_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let years = [2010, 2011, 2012];
    write_population(&dir.path().join("penduduk.xlsx"), &years, &POPULATION[..3]);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &years, &LABOR[..3], "Kota Bekasi");

    let config = PipelineConfig {
        start_year: 2010,
        end_year: 2012,
        ..config(&dir)
    };
    let err = run_pipeline(&config).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("labor force"));
}

#[test]
fn reversed_year_span_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(&dir);

    let config = PipelineConfig {
        start_year: 2024,
        end_year: 2020,
        ..config(&dir)
    };
    let err = run_pipeline(&config).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("year span"));
    assert!(!config.outputs.reconciled_xlsx().exists());
}

#[test]
fn disabled_fallback_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    write_population(&dir.path().join("penduduk.xlsx"), &YEARS, &POPULATION);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &YEARS, &LABOR, "Kota Bekasi");

    let config = PipelineConfig {
        fallback: false,
        ..config(&dir)
    };
    let err = run_pipeline(&config).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("labor force"));
}

#[test]
fn unreadable_workbook_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_pipeline(&config(&dir)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("penduduk.xlsx"));
}

#[test]
fn constant_population_fails_the_fit() {
    let dir = tempfile::tempdir().unwrap();
    write_population(&dir.path().join("penduduk.xlsx"), &YEARS, &[1800000.0; 5]);
    write_labor(&dir.path().join("angkatan_kerja.xlsx"), &YEARS, &LABOR, "Kota Tangerang");

    let err = run_pipeline(&config(&dir)).unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn regress_from_table_matches_full_run() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(&dir);
    let config = config(&dir);
    let clean = run_clean(&config).unwrap();

    let regress_config = PipelineConfig {
        reconciled_path: Some(config.outputs.reconciled_xlsx()),
        outputs: OutputPaths {
            dir: dir.path().join("regress"),
        },
        ..PipelineConfig::default()
    };
    let run = run_regress_from_table(&regress_config).unwrap();

    assert_eq!(run.clean.origin, DataOrigin::ReconciledTable);
    assert_eq!(run.clean.rows(), clean.rows());
    assert!(rel(run.result.slope, 0.31531494269886584) < 1e-6);
    assert!(regress_config.outputs.output_xlsx().exists());
}
