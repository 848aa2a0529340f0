//! Year-keyed reconciliation of the population and labor-force series.
//!
//! The two series are outer-joined on year and rows with a missing side are
//! dropped, which leaves exactly the years present in both. Expected years
//! without a surviving row are reported, not treated as an error.

use std::collections::BTreeSet;

use crate::domain::{ReconciledRow, YearSeries};

/// Which side of the join was absent for a dropped year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
    Population,
    LaborForce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedYear {
    pub year: i32,
    pub missing: MissingSide,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Ascending by year.
    pub rows: Vec<ReconciledRow>,
    /// `expected - {years with a row}`.
    pub missing_years: BTreeSet<i32>,
    /// Years seen in exactly one series.
    pub dropped: Vec<DroppedYear>,
}

impl Reconciliation {
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }
}

/// Join `population` (x) and `labor` (y) on year.
pub fn reconcile(
    population: &YearSeries,
    labor: &YearSeries,
    expected_years: &BTreeSet<i32>,
) -> Reconciliation {
    let union: BTreeSet<i32> = population.years().chain(labor.years()).collect();

    let mut rows = Vec::with_capacity(union.len());
    let mut dropped = Vec::new();

    for year in union {
        match (population.get(year), labor.get(year)) {
            (Some(x), Some(y)) => rows.push(ReconciledRow { year, x, y }),
            (None, _) => dropped.push(DroppedYear {
                year,
                missing: MissingSide::Population,
            }),
            (_, None) => dropped.push(DroppedYear {
                year,
                missing: MissingSide::LaborForce,
            }),
        }
    }

    let present: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
    let missing_years: BTreeSet<i32> = expected_years.difference(&present).copied().collect();

    for d in &dropped {
        let side = match d.missing {
            MissingSide::Population => "population",
            MissingSide::LaborForce => "labor force",
        };
        log::warn!("year {} dropped: no {side} value", d.year);
    }
    if !missing_years.is_empty() {
        log::warn!("missing years: {:?}", missing_years);
    }
    log::info!("reconciled {} year(s)", rows.len());

    Reconciliation {
        rows,
        missing_years,
        dropped,
    }
}
