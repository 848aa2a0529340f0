//! Workbook access.
//!
//! Source files are `.xls`/`.xlsx`/`.ods` workbooks with one sheet per year.
//! A sheet is loaded into a [`SheetTable`]: the first non-empty row becomes the
//! header row and the remaining rows are typed cells. Extraction only ever sees
//! `SheetTable`s, which keeps the column heuristics testable without files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader, Sheets, open_workbook_auto};

use crate::error::{DataError, ExtractError};

/// A typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The value of a number-typed cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of a number cell, or of a text cell holding a plain number.
    pub fn parse_number(&self) -> Option<f64> {
        match self {
            Cell::Number(_) => self.as_number(),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Float(n) => Cell::Number(*n),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) => {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            // Date cells are kept as their serial number.
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// One sheet: a header row plus data rows, all padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let mut headers = headers;
        for idx in headers.len()..width {
            headers.push(unnamed(idx));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a table from a raw grid: the first non-empty row is the header.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        let mut rows = grid.into_iter().skip_while(|row| row.iter().all(Cell::is_empty));

        let headers = rows
            .next()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| header_name(idx, cell))
                    .collect()
            })
            .unwrap_or_default();

        let data: Vec<Vec<Cell>> = rows.filter(|row| !row.iter().all(Cell::is_empty)).collect();

        Self::new(name, headers, data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    /// A column is numeric-typed when it holds at least one number and every
    /// non-empty cell is a number.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut any_number = false;
        for cell in self.column(idx) {
            match cell {
                Cell::Empty => {}
                Cell::Number(_) => any_number = true,
                Cell::Text(_) | Cell::Bool(_) => return false,
            }
        }
        any_number
    }

    /// Indices of numeric-typed columns in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.width()).filter(|&idx| self.is_numeric_column(idx)).collect()
    }
}

fn header_name(idx: usize, cell: &Cell) -> String {
    match cell {
        Cell::Empty => unnamed(idx),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Cell::Bool(b) => if *b { "True" } else { "False" }.to_string(),
    }
}

fn unnamed(idx: usize) -> String {
    format!("Unnamed: {idx}")
}

/// Anything that can hand out sheets by name.
pub trait WorkbookSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Load a sheet by exact name.
    fn sheet(&mut self, name: &str) -> Result<SheetTable, ExtractError>;
}

/// A workbook file opened with calamine.
pub struct ExcelWorkbook {
    inner: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    pub fn open(path: &Path) -> Result<Self, DataError> {
        let inner = open_workbook_auto(path).map_err(|e| DataError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("opened workbook {}", path.display());
        Ok(Self { inner })
    }
}

impl WorkbookSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetTable, ExtractError> {
        if !self.inner.sheet_names().iter().any(|n| n == name) {
            return Err(ExtractError::MissingSheet {
                sheet: name.to_string(),
            });
        }

        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| ExtractError::UnreadableSheet {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(SheetTable::from_grid(name, grid))
    }
}

/// In-memory workbook for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetTable>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: SheetTable) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetTable, ExtractError> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| ExtractError::MissingSheet {
                sheet: name.to_string(),
            })
    }
}
