//! Year series construction from per-year sheets.
//!
//! Each sheet label is a year. Sheets that fail extraction are skipped and
//! reported as [`SheetWarning`]s: a partial series is a valid result, only a
//! source where *every* sheet failed is an error.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{SeriesKind, YearSeries, YearValue, is_calendar_year};
use crate::error::{ExtractError, SeriesError};
use crate::io::extract::{ColumnChoice, SheetExtractor};
use crate::io::workbook::WorkbookSource;

/// A skipped sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetWarning {
    pub kind: SeriesKind,
    pub sheet: String,
    pub error: ExtractError,
}

impl fmt::Display for SheetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] sheet {}: {}", self.kind, self.sheet, self.error)
    }
}

/// A built series plus the sheets that were skipped on the way.
#[derive(Debug, Clone)]
pub struct SeriesBuild {
    pub series: YearSeries,
    pub warnings: Vec<SheetWarning>,
}

/// Incremental series construction. Re-inserting a year replaces its value.
#[derive(Debug, Clone)]
pub struct YearSeriesBuilder {
    kind: SeriesKind,
    values: BTreeMap<i32, f64>,
    order: Vec<YearValue>,
    warnings: Vec<SheetWarning>,
}

impl YearSeriesBuilder {
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
            order: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Insert a value, returning the one it replaced (if any).
    pub fn insert(&mut self, year: i32, value: f64) -> Option<f64> {
        self.order.push(YearValue { year, value });
        let previous = self.values.insert(year, value);
        if let Some(prev) = previous {
            log::warn!(
                "[{}] year {year} seen twice; replacing {prev} with {value}",
                self.kind
            );
        }
        previous
    }

    pub fn warn(&mut self, sheet: &str, error: ExtractError) {
        let warning = SheetWarning {
            kind: self.kind,
            sheet: sheet.to_string(),
            error,
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn finish(self) -> SeriesBuild {
        SeriesBuild {
            series: YearSeries::from_values(self.order),
            warnings: self.warnings,
        }
    }
}

/// Parse a sheet label as a 4-digit year.
pub fn parse_year_label(label: &str) -> Result<i32, ExtractError> {
    label
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|&y| is_calendar_year(y))
        .ok_or_else(|| ExtractError::InvalidYear {
            sheet: label.to_string(),
        })
}

/// Read one value per sheet and assemble the series for `kind`.
pub fn build_series<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    sheet_names: &[String],
    kind: SeriesKind,
    extractor: &SheetExtractor,
) -> Result<SeriesBuild, SeriesError> {
    let mut builder = YearSeriesBuilder::new(kind);

    for name in sheet_names {
        let year = match parse_year_label(name) {
            Ok(y) => y,
            Err(e) => {
                builder.warn(name, e);
                continue;
            }
        };

        let extracted = workbook
            .sheet(name)
            .and_then(|sheet| {
                log::debug!(
                    "[{kind}] sheet {name}: {} row(s), columns {:?}",
                    sheet.rows().len(),
                    sheet.headers()
                );
                extractor.extract(&sheet, kind)
            });

        match extracted {
            Ok(found) => {
                let how = match found.choice {
                    ColumnChoice::NameMatch { keyword } => format!("header match '{keyword}'"),
                    ColumnChoice::NumericFallback => "numeric fallback".to_string(),
                };
                log::debug!("[{kind}] sheet {name}: column '{}' ({how})", found.column);
                log::info!("[{kind}] {year}: {}", found.value);
                builder.insert(year, found.value);
            }
            Err(e) => builder.warn(name, e),
        }
    }

    if builder.is_empty() {
        return Err(SeriesError::EmptySeries {
            kind,
            attempted: sheet_names.len(),
            warnings: builder.finish().warnings,
        });
    }

    let build = builder.finish();
    log::info!(
        "[{kind}] {} of {} sheet(s) read; years {:?}",
        build.series.len(),
        sheet_names.len(),
        build.series.years().collect::<Vec<_>>()
    );
    Ok(build)
}
