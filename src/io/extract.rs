//! Per-sheet value extraction.
//!
//! Source sheets do not share a schema, so the relevant column is discovered
//! heuristically:
//!
//! 1. header names, trimmed and lowercased, are tested against an ordered list
//!    of substring keywords; the first column (in column order) that contains
//!    any keyword wins
//! 2. otherwise a numeric-typed column is picked by position: the first one for
//!    population sheets, the last one for labor-force sheets
//!
//! Population sheets list one row per subdivision, so the chosen column is
//! summed into a city total. Labor-force sheets list one row per regency/city;
//! the entity row is located first and its single value is returned.

use crate::domain::SeriesKind;
use crate::error::ExtractError;
use crate::io::workbook::SheetTable;

/// Header keywords for population sheets, in priority order.
pub const POPULATION_KEYWORDS: &[&str] = &["penduduk", "jumlah"];
/// Header keywords for labor-force sheets.
pub const LABOR_KEYWORDS: &[&str] = &["jumlah"];

/// How the value column was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChoice {
    NameMatch { keyword: &'static str },
    NumericFallback,
}

/// A located column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMatch {
    pub index: usize,
    pub choice: ColumnChoice,
}

/// The value extracted from one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: f64,
    pub column: String,
    pub choice: ColumnChoice,
}

/// Find the first column whose normalized name contains one of `keywords`.
pub fn find_column_by_name(headers: &[String], keywords: &[&'static str]) -> Option<ColumnMatch> {
    headers.iter().enumerate().find_map(|(index, name)| {
        let name = normalize_name(name);
        keywords
            .iter()
            .find(|kw| name.contains(*kw))
            .map(|&keyword| ColumnMatch {
                index,
                choice: ColumnChoice::NameMatch { keyword },
            })
    })
}

/// Resolve the value column for `kind`: name heuristics first, then position.
pub fn locate_column(sheet: &SheetTable, kind: SeriesKind) -> Option<ColumnMatch> {
    let keywords = match kind {
        SeriesKind::Population => POPULATION_KEYWORDS,
        SeriesKind::LaborForce => LABOR_KEYWORDS,
    };
    if let Some(found) = find_column_by_name(sheet.headers(), keywords) {
        return Some(found);
    }

    let numeric = sheet.numeric_columns();
    let index = match kind {
        SeriesKind::Population => numeric.first(),
        SeriesKind::LaborForce => numeric.last(),
    };
    index.map(|&index| ColumnMatch {
        index,
        choice: ColumnChoice::NumericFallback,
    })
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// Extracts one scalar per sheet.
#[derive(Debug, Clone)]
pub struct SheetExtractor {
    entity: String,
}

impl SheetExtractor {
    /// `entity` is the name fragment that identifies the labor-force row.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    pub fn extract(&self, sheet: &SheetTable, kind: SeriesKind) -> Result<Extraction, ExtractError> {
        match kind {
            SeriesKind::Population => self.extract_population(sheet),
            SeriesKind::LaborForce => self.extract_labor_force(sheet),
        }
    }

    fn extract_population(&self, sheet: &SheetTable) -> Result<Extraction, ExtractError> {
        let found = locate_column(sheet, SeriesKind::Population).ok_or(ExtractError::MissingColumn {
            kind: SeriesKind::Population,
        })?;

        let column = sheet.headers()[found.index].clone();
        // Non-numeric cells (blank spacer rows, footnotes) are ignored, but at
        // least one cell has to parse.
        let mut numbers = sheet.column(found.index).filter_map(|c| c.parse_number()).peekable();
        if numbers.peek().is_none() {
            return Err(ExtractError::EmptyColumn { column });
        }
        let value: f64 = numbers.sum();

        Ok(Extraction {
            value,
            column,
            choice: found.choice,
        })
    }

    fn extract_labor_force(&self, sheet: &SheetTable) -> Result<Extraction, ExtractError> {
        let needle = self.entity.trim().to_lowercase();
        let row = sheet
            .rows()
            .iter()
            .find(|row| {
                row.first()
                    .and_then(|c| c.as_text())
                    .is_some_and(|label| label.to_lowercase().contains(&needle))
            })
            .ok_or_else(|| ExtractError::MissingEntity {
                entity: self.entity.clone(),
            })?;

        let found = locate_column(sheet, SeriesKind::LaborForce).ok_or(ExtractError::MissingColumn {
            kind: SeriesKind::LaborForce,
        })?;

        let column = sheet.headers()[found.index].clone();
        let value = row
            .get(found.index)
            .and_then(|c| c.parse_number())
            .ok_or_else(|| ExtractError::NonNumericValue {
                column: column.clone(),
                row_label: row
                    .first()
                    .and_then(|c| c.as_text())
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            })?;

        Ok(Extraction {
            value,
            column,
            choice: found.choice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::workbook::Cell;

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> SheetTable {
        SheetTable::new("2020", headers.iter().map(|s| s.to_string()).collect(), rows)
    }

    #[test]
    fn population_sums_matching_column() {
        let sheet = table(
            &["Kecamatan", "Jumlah Penduduk"],
            vec![
                vec![Cell::text("Ciledug"), Cell::Number(100.0)],
                vec![Cell::text("Cipondoh"), Cell::Number(200.0)],
                vec![Cell::text("Karawaci"), Cell::Number(300.0)],
            ],
        );
        let out = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::Population)
            .unwrap();
        assert_eq!(out.value, 600.0);
        assert_eq!(out.column, "Jumlah Penduduk");
        assert_eq!(out.choice, ColumnChoice::NameMatch { keyword: "penduduk" });
    }

    #[test]
    fn population_falls_back_to_first_numeric_column() {
        let sheet = table(
            &["Kecamatan", "Count"],
            vec![
                vec![Cell::text("Ciledug"), Cell::Number(10.0)],
                vec![Cell::text("Cipondoh"), Cell::Number(20.0)],
            ],
        );
        let out = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::Population)
            .unwrap();
        assert_eq!(out.value, 30.0);
        assert_eq!(out.choice, ColumnChoice::NumericFallback);
    }

    #[test]
    fn header_match_is_trimmed_and_case_insensitive() {
        let headers = vec!["Kecamatan".to_string(), "  JUMLAH ".to_string()];
        let found = find_column_by_name(&headers, POPULATION_KEYWORDS).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn first_matching_column_wins_in_column_order() {
        let headers = vec![
            "Jumlah KK".to_string(),
            "Penduduk".to_string(),
        ];
        let found = find_column_by_name(&headers, POPULATION_KEYWORDS).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn population_without_numeric_column_is_missing_column() {
        let sheet = table(&["Kecamatan", "Catatan"], vec![vec![Cell::text("a"), Cell::text("b")]]);
        let err = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::Population)
            .unwrap_err();
        assert_eq!(err, ExtractError::MissingColumn { kind: SeriesKind::Population });
    }

    #[test]
    fn population_column_without_numbers_is_empty_column() {
        let sheet = table(
            &["Kecamatan", "Jumlah Penduduk", "Luas"],
            vec![
                vec![Cell::text("Ciledug"), Cell::text("-"), Cell::text("-")],
                vec![Cell::text("Karawaci"), Cell::text("-"), Cell::text("-")],
            ],
        );
        let err = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::Population)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::EmptyColumn {
                column: "Jumlah Penduduk".to_string()
            }
        );
    }

    #[test]
    fn labor_force_reads_entity_row() {
        let sheet = table(
            &["Kabupaten/Kota", "Bekerja", "Pengangguran", "Jumlah"],
            vec![
                vec![Cell::text("Kabupaten Tangerang"), Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)],
                vec![Cell::text("Kota Serang"), Cell::Number(4.0), Cell::Number(5.0), Cell::Number(9.0)],
            ],
        );
        let out = SheetExtractor::new("tangerang")
            .extract(&sheet, SeriesKind::LaborForce)
            .unwrap();
        // First matching row wins.
        assert_eq!(out.value, 3.0);
        assert_eq!(out.column, "Jumlah");
    }

    #[test]
    fn labor_force_falls_back_to_last_numeric_column() {
        let sheet = table(
            &["Wilayah", "Laki-laki", "Perempuan"],
            vec![vec![Cell::text("Kota Tangerang"), Cell::Number(700.0), Cell::Number(650.0)]],
        );
        let out = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::LaborForce)
            .unwrap();
        assert_eq!(out.value, 650.0);
        assert_eq!(out.choice, ColumnChoice::NumericFallback);
    }

    #[test]
    fn labor_force_without_entity_is_missing_entity() {
        let sheet = table(&["Wilayah", "Jumlah"], vec![vec![Cell::text("Kota Serang"), Cell::Number(1.0)]]);
        let err = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::LaborForce)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingEntity {
                entity: "Tangerang".to_string()
            }
        );
    }

    #[test]
    fn labor_force_with_blank_value_is_non_numeric() {
        let sheet = table(&["Wilayah", "Jumlah"], vec![vec![Cell::text("Kota Tangerang"), Cell::text("-")]]);
        let err = SheetExtractor::new("Tangerang")
            .extract(&sheet, SeriesKind::LaborForce)
            .unwrap_err();
        assert!(matches!(err, ExtractError::NonNumericValue { .. }));
    }
}
