//! Reading a reconciled `(Tahun, X, Y)` table back from a workbook.
//!
//! The table written by `clean`/`run` uses fixed headers, but hand-edited or
//! older tables may use other names, so each column is found through a list
//! of candidate headers matched case-insensitively.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{LABOR_HEADER, POPULATION_HEADER, ReconciledRow, YEAR_HEADER, is_calendar_year};
use crate::error::DataError;
use crate::io::export::SUMMARY_SHEET;
use crate::io::workbook::{Cell, ExcelWorkbook, SheetTable, WorkbookSource};

pub const YEAR_CANDIDATES: &[&str] = &[YEAR_HEADER, "Year"];
pub const POPULATION_CANDIDATES: &[&str] = &[POPULATION_HEADER, "Jumlah Penduduk", "Population", "Penduduk"];
pub const LABOR_CANDIDATES: &[&str] = &[LABOR_HEADER, "Angkatan Kerja", "Workforce"];

fn normalize(s: &str) -> String {
    s.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// Index of the first candidate (in candidate order) present among `headers`.
pub fn find_header(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
    candidates.iter().find_map(|c| {
        let c = normalize(c);
        normalized.iter().position(|h| *h == c)
    })
}

fn year_of(cell: &Cell) -> Option<i32> {
    let v = cell.parse_number()?;
    let year = v as i32;
    (v.fract() == 0.0 && is_calendar_year(year)).then_some(year)
}

/// Extract reconciled rows from an already loaded sheet.
///
/// Rows with a missing or non-numeric field are skipped. Rows are returned in
/// ascending year order; a repeated year keeps its last row.
pub fn rows_from_sheet(path: &Path, sheet: &SheetTable) -> Result<Vec<ReconciledRow>, DataError> {
    let column = |candidates: &[&str]| {
        find_header(sheet.headers(), candidates).ok_or_else(|| DataError::MissingHeader {
            path: path.to_path_buf(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
    };
    let year_col = column(YEAR_CANDIDATES)?;
    let x_col = column(POPULATION_CANDIDATES)?;
    let y_col = column(LABOR_CANDIDATES)?;

    let mut by_year = BTreeMap::new();
    for (i, row) in sheet.rows().iter().enumerate() {
        let fields = (
            row.get(year_col).and_then(year_of),
            row.get(x_col).and_then(Cell::parse_number),
            row.get(y_col).and_then(Cell::parse_number),
        );
        match fields {
            (Some(year), Some(x), Some(y)) => {
                by_year.insert(year, ReconciledRow { year, x, y });
            }
            _ => log::warn!("{}: row {} skipped: incomplete values", path.display(), i + 2),
        }
    }

    if by_year.is_empty() {
        return Err(DataError::InvalidTable {
            path: path.to_path_buf(),
            message: "no complete (year, population, labor force) rows".to_string(),
        });
    }
    Ok(by_year.into_values().collect())
}

/// Read a reconciled table workbook (sheet `Summary`, else the first sheet).
pub fn read_reconciled_table(path: &Path) -> Result<Vec<ReconciledRow>, DataError> {
    let mut workbook = ExcelWorkbook::open(path)?;
    let names = workbook.sheet_names();
    let name = names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(SUMMARY_SHEET))
        .or_else(|| names.first())
        .cloned()
        .ok_or_else(|| DataError::InvalidTable {
            path: path.to_path_buf(),
            message: "workbook has no sheets".to_string(),
        })?;

    let sheet = workbook.sheet(&name).map_err(|e| DataError::InvalidTable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rows = rows_from_sheet(path, &sheet)?;
    log::info!("read {} reconciled row(s) from {} [{name}]", rows.len(), path.display());
    Ok(rows)
}
