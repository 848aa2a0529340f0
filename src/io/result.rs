//! Read/write regression result JSON files.
//!
//! Result JSON is the portable record of a run:
//! - coefficients, correlation, determination and fit quality
//! - the per-year predictions and the sums table
//! - run metadata (where the rows came from, expected and missing years)
//!
//! `popreg plot` re-renders the ASCII chart from this file. The schema is
//! defined by `domain::ResultFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Local;

use crate::domain::{DataOrigin, RegressionResult, ResultFile};
use crate::error::DataError;

/// Wrap a result with run metadata, stamped with the current local time.
pub fn result_file(
    result: &RegressionResult,
    origin: DataOrigin,
    expected_years: Vec<i32>,
    missing_years: Vec<i32>,
) -> ResultFile {
    ResultFile {
        tool: "popreg".to_string(),
        generated_at: Local::now().naive_local(),
        origin,
        expected_years,
        missing_years,
        result: result.clone(),
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, file: &ResultFile) -> Result<(), DataError> {
    let out = File::create(path).map_err(|e| DataError::write(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(out), file).map_err(|e| DataError::write(path, e))?;
    log::info!("wrote result JSON to {}", path.display());
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, DataError> {
    let file = File::open(path).map_err(|e| DataError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_reader(file).map_err(|e| DataError::InvalidTable {
        path: path.to_path_buf(),
        message: format!("invalid result JSON: {e}"),
    })
}
