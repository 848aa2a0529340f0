//! Reporting: dataset statistics, terminal text and the PDF report.

pub mod format;
pub mod pdf;

pub use format::*;
pub use pdf::*;

use crate::domain::ReconciledRow;

/// Summary statistics of the reconciled dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n: usize,
    pub year_min: i32,
    pub year_max: i32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub mean_x: f64,
    pub mean_y: f64,
}

impl DatasetStats {
    /// `None` for an empty table.
    pub fn from_rows(rows: &[ReconciledRow]) -> Option<Self> {
        let first = rows.first()?;
        let mut stats = Self {
            n: rows.len(),
            year_min: first.year,
            year_max: first.year,
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
            mean_x: 0.0,
            mean_y: 0.0,
        };
        for r in rows {
            stats.year_min = stats.year_min.min(r.year);
            stats.year_max = stats.year_max.max(r.year);
            stats.x_min = stats.x_min.min(r.x);
            stats.x_max = stats.x_max.max(r.x);
            stats.y_min = stats.y_min.min(r.y);
            stats.y_max = stats.y_max.max(r.y);
            stats.mean_x += r.x;
            stats.mean_y += r.y;
        }
        stats.mean_x /= rows.len() as f64;
        stats.mean_y /= rows.len() as f64;
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_cover_ranges_and_means() {
        let rows = vec![
            ReconciledRow { year: 2021, x: 10.0, y: 100.0 },
            ReconciledRow { year: 2020, x: 30.0, y: 300.0 },
        ];
        let s = DatasetStats::from_rows(&rows).unwrap();
        assert_eq!((s.n, s.year_min, s.year_max), (2, 2020, 2021));
        assert_eq!((s.x_min, s.x_max), (10.0, 30.0));
        assert_eq!(s.mean_x, 20.0);
        assert_eq!(s.mean_y, 200.0);
        assert!(DatasetStats::from_rows(&[]).is_none());
    }
}
