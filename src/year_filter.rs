// 📅 Year-Range Filter - keep only the years both departments cover
// Years ≤ 1900 are unparsed-date sentinels; an empty overlap falls back to unfiltered data

use crate::records::AlignedRecord;
use std::collections::BTreeSet;

/// Years at or below this are treated as invalid, not historical
pub const INVALID_YEAR_CEILING: i32 = 1900;

/// Valid years present in a set
pub fn valid_years(records: &[AlignedRecord]) -> BTreeSet<i32> {
    records
        .iter()
        .filter_map(|r| r.arrest_year)
        .filter(|y| *y > INVALID_YEAR_CEILING)
        .collect()
}

pub fn overlapping_years(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> BTreeSet<i32> {
    valid_years(nypd)
        .intersection(&valid_years(lapd))
        .copied()
        .collect()
}

/// Restrict both sets to the years they share. Returns both unchanged when either
/// carries no year at all or the overlap is empty.
pub fn filter_by_overlapping_years(
    nypd: &[AlignedRecord],
    lapd: &[AlignedRecord],
) -> (Vec<AlignedRecord>, Vec<AlignedRecord>) {
    let has_years = |records: &[AlignedRecord]| records.iter().any(|r| r.arrest_year.is_some());
    if !has_years(nypd) || !has_years(lapd) {
        log::warn!("Arrest_Year missing from a dataset; skipping year-range filter");
        return (nypd.to_vec(), lapd.to_vec());
    }

    let overlap = overlapping_years(nypd, lapd);
    if overlap.is_empty() {
        log::warn!("No overlapping years between datasets; returning both unfiltered");
        return (nypd.to_vec(), lapd.to_vec());
    }

    let keep = |records: &[AlignedRecord]| -> Vec<AlignedRecord> {
        records
            .iter()
            .filter(|r| r.arrest_year.is_some_and(|y| overlap.contains(&y)))
            .cloned()
            .collect()
    };
    let (nypd_out, lapd_out) = (keep(nypd), keep(lapd));

    log::info!(
        "Year overlap {:?}..={:?}: NYPD {} → {}, LAPD {} → {}",
        overlap.first(),
        overlap.last(),
        nypd.len(),
        nypd_out.len(),
        lapd.len(),
        lapd_out.len()
    );
    (nypd_out, lapd_out)
}

// ============================================================================
// YEAR RANGE SELECTION
// ============================================================================

/// Smallest and largest valid year across both sets
pub fn available_year_range(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> Option<(i32, i32)> {
    let mut all = valid_years(nypd);
    all.extend(valid_years(lapd));
    Some((*all.first()?, *all.last()?))
}

/// Keep rows with `from <= Arrest_Year <= to`
pub fn filter_year_range(records: &[AlignedRecord], from: i32, to: i32) -> Vec<AlignedRecord> {
    records
        .iter()
        .filter(|r| r.arrest_year.is_some_and(|y| y >= from && y <= to))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Department;

    fn years(department: Department, values: &[i32]) -> Vec<AlignedRecord> {
        values
            .iter()
            .map(|y| AlignedRecord {
                arrest_year: Some(*y),
                ..AlignedRecord::empty(department)
            })
            .collect()
    }

    fn nypd(values: &[i32]) -> Vec<AlignedRecord> {
        years(Department::Nypd, values)
    }

    fn lapd(values: &[i32]) -> Vec<AlignedRecord> {
        years(Department::Lapd, values)
    }

    #[test]
    fn test_filters_to_intersection() {
        let (n, l) = filter_by_overlapping_years(&nypd(&[2014, 2015, 2016, 2016]), &lapd(&[2015, 2016, 2017]));

        assert_eq!(valid_years(&n), BTreeSet::from([2015, 2016]));
        assert_eq!(valid_years(&l), BTreeSet::from([2015, 2016]));
        assert_eq!(n.len(), 3);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn test_disjoint_years_return_unfiltered() {
        let (n, l) = filter_by_overlapping_years(&nypd(&[2010, 2011]), &lapd(&[2018, 2019, 2019]));

        assert_eq!(n.len(), 2);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn test_sentinel_years_excluded() {
        let (n_in, l_in) = (nypd(&[1900, 2015]), lapd(&[1900, 2015]));

        let (n, _) = filter_by_overlapping_years(&n_in, &l_in);

        assert_eq!(overlapping_years(&n_in, &l_in), BTreeSet::from([2015]));
        assert_eq!(n.len(), 1);
    }

    #[test]
    fn test_set_without_years_returns_unfiltered() {
        let n_in = nypd(&[2015]);
        let l_in = vec![AlignedRecord::empty(Department::Lapd); 2];

        let (n, l) = filter_by_overlapping_years(&n_in, &l_in);
        assert_eq!(n, n_in);
        assert_eq!(l, l_in);
    }

    #[test]
    fn test_rows_without_year_dropped_when_filtering() {
        let mut n_in = nypd(&[2015]);
        n_in.push(AlignedRecord::empty(Department::Nypd));

        let (n, _) = filter_by_overlapping_years(&n_in, &lapd(&[2015]));
        assert_eq!(n.len(), 1);
    }

    #[test]
    fn test_year_range_selection() {
        let n = nypd(&[2012, 2015, 2019]);
        let l = lapd(&[1899, 2013]);

        assert_eq!(available_year_range(&n, &l), Some((2012, 2019)));
        assert_eq!(filter_year_range(&n, 2013, 2015).len(), 1);
        assert_eq!(available_year_range(&[], &[]), None);
    }
}
