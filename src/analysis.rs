// 📊 Comparison Views - temporal and demographic aggregates of an aligned pair
// Descriptive only: counts, percentages, a linear trend, a rolling mean

use crate::records::AlignedRecord;
use crate::vocabulary::{AgeCategory, Category, Gender, OffenseCategory, Race};
use crate::year_filter::INVALID_YEAR_CEILING;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Years needed before a trend line is fitted
pub const MIN_TREND_YEARS: usize = 3;

fn record_date(record: &AlignedRecord) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(record.arrest_year?, record.arrest_month?, record.arrest_day?)
}

fn count_by<K: Ord>(records: &[AlignedRecord], key: impl Fn(&AlignedRecord) -> Option<K>) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for k in records.iter().filter_map(key) {
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// TEMPORAL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub nypd: usize,
    pub lapd: usize,
    pub nypd_trend: Option<f64>,
    pub lapd_trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: u32,
    pub nypd: usize,
    pub lapd: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub nypd: usize,
    pub lapd: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub day: u32,
    pub nypd: usize,
    pub lapd: usize,
    /// Centered 3-day mean; `None` on the first and last day
    pub nypd_rolling: Option<f64>,
    pub lapd_rolling: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalSummary {
    pub by_year: Vec<YearCount>,
    pub by_month: Vec<MonthCount>,
    pub by_weekday: Vec<WeekdayCount>,
    pub by_day_of_month: Vec<DayCount>,
}

/// Least-squares line through (x, y), evaluated at each x
pub fn linear_trend(xs: &[f64], ys: &[f64]) -> Option<Vec<f64>> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Some(xs.iter().map(|x| slope * x + intercept).collect())
}

/// Centered rolling mean over `window` values; edges without a full window are `None`
pub fn rolling_mean_centered(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            if window == 0 || i < half || i + (window - half) > values.len() {
                return None;
            }
            let slice = &values[i - half..i - half + window];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Yearly counts for both departments over the union of their valid years
pub fn counts_by_year(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> Vec<YearCount> {
    let valid_year = |r: &AlignedRecord| r.arrest_year.filter(|y| *y > INVALID_YEAR_CEILING);
    let n = count_by(nypd, valid_year);
    let l = count_by(lapd, valid_year);

    let mut years: Vec<i32> = n.keys().chain(l.keys()).copied().collect();
    years.sort_unstable();
    years.dedup();

    let nypd_counts: Vec<f64> = years.iter().map(|y| *n.get(y).unwrap_or(&0) as f64).collect();
    let lapd_counts: Vec<f64> = years.iter().map(|y| *l.get(y).unwrap_or(&0) as f64).collect();

    let (nypd_trend, lapd_trend) = if years.len() >= MIN_TREND_YEARS {
        let xs: Vec<f64> = years.iter().map(|y| *y as f64).collect();
        (linear_trend(&xs, &nypd_counts), linear_trend(&xs, &lapd_counts))
    } else {
        (None, None)
    };

    years
        .iter()
        .enumerate()
        .map(|(i, year)| YearCount {
            year: *year,
            nypd: *n.get(year).unwrap_or(&0),
            lapd: *l.get(year).unwrap_or(&0),
            nypd_trend: nypd_trend.as_ref().map(|t| t[i]),
            lapd_trend: lapd_trend.as_ref().map(|t| t[i]),
        })
        .collect()
}

pub fn counts_by_month(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> Vec<MonthCount> {
    let month = |r: &AlignedRecord| r.arrest_month.filter(|m| (1..=12).contains(m));
    let n = count_by(nypd, month);
    let l = count_by(lapd, month);
    (1..=12u32)
        .map(|m| MonthCount {
            month: m,
            nypd: *n.get(&m).unwrap_or(&0),
            lapd: *l.get(&m).unwrap_or(&0),
        })
        .collect()
}

/// Monday first; rows whose year/month/day do not form a date are skipped
pub fn counts_by_weekday(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> Vec<WeekdayCount> {
    let weekday = |r: &AlignedRecord| record_date(r).map(|d| d.weekday().num_days_from_monday());
    let n = count_by(nypd, weekday);
    let l = count_by(lapd, weekday);
    WEEKDAYS
        .iter()
        .map(|w| {
            let k = w.num_days_from_monday();
            WeekdayCount {
                weekday: w.to_string(),
                nypd: *n.get(&k).unwrap_or(&0),
                lapd: *l.get(&k).unwrap_or(&0),
            }
        })
        .collect()
}

pub fn counts_by_day_of_month(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> Vec<DayCount> {
    let day = |r: &AlignedRecord| r.arrest_day.filter(|d| (1..=31).contains(d));
    let n = count_by(nypd, day);
    let l = count_by(lapd, day);

    let nypd_counts: Vec<f64> = (1..=31u32).map(|d| *n.get(&d).unwrap_or(&0) as f64).collect();
    let lapd_counts: Vec<f64> = (1..=31u32).map(|d| *l.get(&d).unwrap_or(&0) as f64).collect();
    let nypd_rolling = rolling_mean_centered(&nypd_counts, 3);
    let lapd_rolling = rolling_mean_centered(&lapd_counts, 3);

    (1..=31u32)
        .enumerate()
        .map(|(i, d)| DayCount {
            day: d,
            nypd: *n.get(&d).unwrap_or(&0),
            lapd: *l.get(&d).unwrap_or(&0),
            nypd_rolling: nypd_rolling[i],
            lapd_rolling: lapd_rolling[i],
        })
        .collect()
}

pub fn temporal_summary(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> TemporalSummary {
    TemporalSummary {
        by_year: counts_by_year(nypd, lapd),
        by_month: counts_by_month(nypd, lapd),
        by_weekday: counts_by_weekday(nypd, lapd),
        by_day_of_month: counts_by_day_of_month(nypd, lapd),
    }
}

// ============================================================================
// DEMOGRAPHIC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub nypd_pct: f64,
    pub lapd_pct: f64,
}

impl CategoryShare {
    pub fn difference(&self) -> f64 {
        self.nypd_pct - self.lapd_pct
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicSummary {
    pub race: Vec<CategoryShare>,
    pub gender: Vec<CategoryShare>,
    pub age: Vec<CategoryShare>,
    /// Sorted by absolute NYPD-LAPD difference, largest first
    pub offense: Vec<CategoryShare>,
}

/// Share of all rows (missing values included in the denominator) per category
pub fn percentage_distribution<T: Category>(
    records: &[AlignedRecord],
    field: impl Fn(&AlignedRecord) -> Option<T>,
    categories: &[T],
) -> Vec<f64> {
    let total = records.len();
    let counts = count_by(records, |r| field(r).map(|c| c.label()));
    categories
        .iter()
        .map(|category| {
            if total == 0 {
                0.0
            } else {
                *counts.get(category.label()).unwrap_or(&0) as f64 / total as f64 * 100.0
            }
        })
        .collect()
}

pub fn compare_distribution<T: Category>(
    nypd: &[AlignedRecord],
    lapd: &[AlignedRecord],
    field: impl Fn(&AlignedRecord) -> Option<T>,
    categories: &[T],
) -> Vec<CategoryShare> {
    let n = percentage_distribution(nypd, &field, categories);
    let l = percentage_distribution(lapd, &field, categories);
    categories
        .iter()
        .zip(n.into_iter().zip(l))
        .map(|(category, (nypd_pct, lapd_pct))| CategoryShare {
            category: category.label().to_string(),
            nypd_pct,
            lapd_pct,
        })
        .collect()
}

pub fn demographic_summary(nypd: &[AlignedRecord], lapd: &[AlignedRecord]) -> DemographicSummary {
    let ages: Vec<AgeCategory> = AgeCategory::ALL
        .iter()
        .copied()
        .filter(|a| *a != AgeCategory::Unknown)
        .collect();

    let mut offense = compare_distribution(nypd, lapd, |r| r.offense_std, OffenseCategory::ALL);
    offense.sort_by(|a, b| b.difference().abs().total_cmp(&a.difference().abs()));

    DemographicSummary {
        race: compare_distribution(nypd, lapd, |r| r.race_std, Race::ALL),
        gender: compare_distribution(nypd, lapd, |r| r.gender_std, Gender::ALL),
        age: compare_distribution(nypd, lapd, |r| r.age_category_std, &ages),
        offense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Department;

    fn dated(dates: &[(i32, u32, u32)]) -> Vec<AlignedRecord> {
        dates
            .iter()
            .map(|&(year, month, day)| AlignedRecord {
                arrest_year: Some(year),
                arrest_month: Some(month),
                arrest_day: Some(day),
                ..AlignedRecord::empty(Department::Nypd)
            })
            .collect()
    }

    fn tagged(department: Department, rows: &[(Option<Gender>, OffenseCategory)]) -> Vec<AlignedRecord> {
        rows.iter()
            .map(|&(gender, offense)| AlignedRecord {
                gender_std: gender,
                offense_std: Some(offense),
                ..AlignedRecord::empty(department)
            })
            .collect()
    }

    #[test]
    fn test_counts_by_year_with_trend() {
        let nypd = dated(&[(2015, 1, 1), (2016, 1, 1), (2016, 1, 2), (2017, 1, 1), (2017, 1, 2), (2017, 1, 3)]);
        let lapd = dated(&[(2016, 5, 5), (1900, 1, 1)]);

        let years = counts_by_year(&nypd, &lapd);

        assert_eq!(years.iter().map(|y| y.year).collect::<Vec<_>>(), vec![2015, 2016, 2017]);
        assert_eq!(years[0].lapd, 0);
        assert_eq!(years[1].lapd, 1);
        // nypd counts 1, 2, 3 lie on a line
        let trend: Vec<f64> = years.iter().map(|y| y.nypd_trend.unwrap()).collect();
        for (t, expected) in trend.iter().zip([1.0, 2.0, 3.0]) {
            assert!((t - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_no_trend_below_three_years() {
        let nypd = dated(&[(2015, 1, 1), (2016, 1, 1)]);
        let years = counts_by_year(&nypd, &dated(&[]));
        assert!(years.iter().all(|y| y.nypd_trend.is_none()));
    }

    #[test]
    fn test_counts_by_month_zero_filled() {
        let months = counts_by_month(&dated(&[(2020, 3, 1), (2020, 3, 2)]), &dated(&[(2020, 12, 1)]));
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].nypd, 2);
        assert_eq!(months[11].lapd, 1);
        assert_eq!(months[0].nypd + months[0].lapd, 0);
    }

    #[test]
    fn test_counts_by_weekday() {
        // 2020-01-06 was a Monday; 2020-02-30 is not a date
        let nypd = dated(&[(2020, 1, 6), (2020, 1, 12), (2020, 2, 30)]);
        let weekdays = counts_by_weekday(&nypd, &dated(&[]));

        assert_eq!(weekdays[0].weekday, "Mon");
        assert_eq!(weekdays[0].nypd, 1);
        assert_eq!(weekdays[6].nypd, 1);
        assert_eq!(weekdays.iter().map(|w| w.nypd).sum::<usize>(), 2);
    }

    #[test]
    fn test_day_of_month_rolling_mean() {
        let nypd = dated(&[(2020, 1, 1), (2020, 1, 2), (2020, 1, 2), (2020, 1, 3), (2020, 1, 3), (2020, 1, 3)]);
        let days = counts_by_day_of_month(&nypd, &dated(&[]));

        assert_eq!(days.len(), 31);
        assert_eq!(days[0].nypd_rolling, None);
        assert_eq!(days[1].nypd_rolling, Some(2.0));
        assert_eq!(days[2].nypd_rolling, Some(5.0 / 3.0));
        assert_eq!(days[30].nypd_rolling, None);
    }

    #[test]
    fn test_rolling_mean_centered() {
        assert_eq!(
            rolling_mean_centered(&[1.0, 2.0, 3.0, 4.0], 3),
            vec![None, Some(2.0), Some(3.0), None]
        );
    }

    #[test]
    fn test_demographic_percentages() {
        use OffenseCategory::{DrugOffense, PropertyCrime};
        let nypd = tagged(
            Department::Nypd,
            &[
                (Some(Gender::Male), DrugOffense),
                (Some(Gender::Male), DrugOffense),
                (Some(Gender::Female), DrugOffense),
                (None, DrugOffense),
            ],
        );
        let lapd = tagged(
            Department::Lapd,
            &[(Some(Gender::Female), PropertyCrime), (Some(Gender::Female), DrugOffense)],
        );

        let summary = demographic_summary(&nypd, &lapd);

        let male = &summary.gender[0];
        assert_eq!(male.category, "Male");
        assert_eq!(male.nypd_pct, 50.0);
        assert_eq!(male.lapd_pct, 0.0);
        assert_eq!(summary.age.len(), 5);
        assert!(summary.age.iter().all(|a| a.category != "UNKNOWN"));
        // Drug Offense differs by 50 points, Property Crime by 50; both ahead of the zeros
        assert!(summary.offense[0].difference().abs() >= summary.offense[2].difference().abs());
        assert_eq!(summary.offense[0].difference().abs(), 50.0);
        assert_eq!(summary.offense.len(), 6);
    }

    #[test]
    fn test_empty_sets_yield_zero_percentages() {
        let shares = percentage_distribution(&[], |r| r.race_std, &[Race::Black]);
        assert_eq!(shares, vec![0.0]);
    }
}
