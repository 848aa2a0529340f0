//! Error types.
//!
//! Stage-level faults are typed enums so callers can decide whether a fault is
//! local (skip one sheet, one row) or fatal. Everything that reaches the CLI is
//! folded into [`AppError`], which carries the process exit code:
//!
//! - `2`: input/output faults (unreadable workbook, unwritable report, bad year span)
//! - `3`: data faults (no usable values, unreadable reconciled table)
//! - `4`: regression faults (too few rows, no variance)

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::SeriesKind;
use crate::io::SheetWarning;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A single sheet's data could not be located. Recovered by skipping the year.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("sheet '{sheet}' not found in workbook")]
    MissingSheet { sheet: String },
    #[error("sheet '{sheet}' could not be read: {message}")]
    UnreadableSheet { sheet: String, message: String },
    #[error("sheet label '{sheet}' is not a 4-digit year")]
    InvalidYear { sheet: String },
    #[error("no {kind} column: no header matched and the sheet has no numeric column")]
    MissingColumn { kind: SeriesKind },
    #[error("no row whose first column contains '{entity}'")]
    MissingEntity { entity: String },
    #[error("value in column '{column}' of row '{row_label}' is not numeric")]
    NonNumericValue { column: String, row_label: String },
    #[error("column '{column}' holds no numeric values")]
    EmptyColumn { column: String },
}

/// Every sheet of a source failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("no {kind} values could be read from any of {attempted} sheet(s)")]
    EmptySeries {
        kind: SeriesKind,
        attempted: usize,
        /// Why each sheet was skipped.
        warnings: Vec<SheetWarning>,
    },
}

impl SeriesError {
    pub fn warnings(&self) -> &[SheetWarning] {
        match self {
            SeriesError::EmptySeries { warnings, .. } => warnings,
        }
    }
}

/// Regression-stage faults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("at least 2 reconciled rows are required for a fit, got {n}")]
    InsufficientData { n: usize },
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: &'static str },
    /// Row-local: the percentage error for this year is undefined.
    #[error("actual value is 0 for year {year}; percentage error is undefined")]
    ZeroActual { year: i32 },
}

/// File-level faults (reading sources, writing reports).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("failed to open workbook '{}': {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("'{}': no column matching any of [{}]", path.display(), candidates.join(", "))]
    MissingHeader { path: PathBuf, candidates: Vec<String> },
    #[error("'{}': {message}", path.display())]
    InvalidTable { path: PathBuf, message: String },
}

impl DataError {
    pub fn write(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        AppError::new(4, format!("Regression failed: {err}"))
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        let code = match err {
            DataError::Open { .. } | DataError::Write { .. } => 2,
            DataError::MissingHeader { .. } | DataError::InvalidTable { .. } => 3,
        };
        AppError::new(code, err.to_string())
    }
}
