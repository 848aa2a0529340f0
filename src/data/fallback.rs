//! Built-in dataset used when a source workbook yields no values.
//!
//! The figures are the 2020–2024 Kota Tangerang totals: population summed over
//! districts (BPS population tables) and the labor-force count for the city.

use std::collections::BTreeSet;

use crate::domain::{SeriesKind, YearSeries, YearValue};

pub const FALLBACK_YEARS: [i32; 5] = [2020, 2021, 2022, 2023, 2024];
pub const FALLBACK_POPULATION: [f64; 5] = [1742604.0, 1771092.0, 1834962.0, 1912679.0, 1927815.0];
pub const FALLBACK_LABOR_FORCE: [f64; 5] = [5552172.0, 5698344.0, 5940618.0, 5516656.0, 5797923.0];

/// The built-in series for `kind`, limited to the `expected` years.
pub fn fallback_series(kind: SeriesKind, expected: &BTreeSet<i32>) -> YearSeries {
    let values = match kind {
        SeriesKind::Population => FALLBACK_POPULATION,
        SeriesKind::LaborForce => FALLBACK_LABOR_FORCE,
    };
    YearSeries::from_values(
        FALLBACK_YEARS
            .iter()
            .zip(values)
            .filter(|&(&year, _)| expected.contains(&year))
            .map(|(&year, value)| YearValue { year, value }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_series_cover_same_years() {
        let all = BTreeSet::from(FALLBACK_YEARS);
        let pop = fallback_series(SeriesKind::Population, &all);
        let lab = fallback_series(SeriesKind::LaborForce, &all);
        assert_eq!(pop.years().collect::<Vec<_>>(), FALLBACK_YEARS.to_vec());
        assert_eq!(lab.years().collect::<Vec<_>>(), FALLBACK_YEARS.to_vec());
        assert_eq!(lab.get(2023), Some(5516656.0));
    }

    #[test]
    fn fallback_series_stay_inside_expected_years() {
        let pop = fallback_series(SeriesKind::Population, &BTreeSet::from([2019, 2021, 2022]));
        assert_eq!(pop.years().collect::<Vec<_>>(), vec![2021, 2022]);

        let none = fallback_series(SeriesKind::LaborForce, &(2010..=2012).collect());
        assert!(none.is_empty());
    }
}
