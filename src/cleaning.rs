// 🧹 Record Cleaner - default-fill policy, date derivation, deduplication
// Row-level problems are repaired in place; date failures are reported, never raised

use crate::records::{LapdRecord, NypdRecord};
use crate::schema::col;
use crate::source::{Department, DepartmentRecord};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// FILL POLICY
// ============================================================================

/// Numeric identifier/code sentinel
pub const MISSING_CODE: i64 = -1;
/// NYPD coordinate sentinel
pub const MISSING_COORDINATE: f64 = 0.0;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_SPECIFIED: &str = "Not Specified";
/// NYPD age-group default, the same spelling as the age bucket
pub const UNKNOWN_AGE_GROUP: &str = "UNKNOWN";

/// Valid LAPD ages, inclusive
pub const VALID_AGE_RANGE: (f64, f64) = (0.0, 100.0);

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum DateParseError {
    #[error("unparsable date {value:?} at row {row}")]
    Unparsable { row: usize, value: String },
}

/// What the cleaner changed, for logging and quality checks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub department: Department,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Cells filled per column
    pub filled: BTreeMap<String, usize>,
    pub invalid_ages: usize,
    pub duplicates_removed: usize,
    pub date_error: Option<DateParseError>,
}

impl CleaningReport {
    fn new(department: Department, rows_in: usize) -> Self {
        CleaningReport {
            department,
            rows_in,
            rows_out: rows_in,
            filled: BTreeMap::new(),
            invalid_ages: 0,
            duplicates_removed: 0,
            date_error: None,
        }
    }

    /// Write `default` into a missing field and count it against `column`
    fn fill<T>(&mut self, column: &str, field: &mut Option<T>, default: impl Into<T>) {
        if field.is_none() {
            *field = Some(default.into());
            *self.filled.entry(column.to_string()).or_insert(0) += 1;
        }
    }

    pub fn total_filled(&self) -> usize {
        self.filled.values().sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} → {} rows, {} cells filled, {} invalid ages, {} duplicates removed{}",
            self.department.code(),
            self.rows_in,
            self.rows_out,
            self.total_filled(),
            self.invalid_ages,
            self.duplicates_removed,
            match &self.date_error {
                Some(e) => format!(", date error: {e}"),
                None => String::new(),
            }
        )
    }

    fn log(&self) {
        log::info!("Cleaned {}", self.summary());
        if let Some(e) = &self.date_error {
            log::error!("Error converting {} arrest date: {}", self.department.code(), e);
        }
    }
}

// ============================================================================
// CLEANERS
// ============================================================================

fn fill_nypd(r: &mut NypdRecord, report: &mut CleaningReport) {
    report.fill(col::PD_CODE, &mut r.pd_code, MISSING_CODE);
    report.fill(col::KY_CODE, &mut r.ky_code, MISSING_CODE);
    report.fill(col::LAW_CATEGORY, &mut r.law_category, UNKNOWN);
    report.fill(col::LAW_CODE, &mut r.law_code, UNKNOWN);
    report.fill(col::OFFENSE_DESCRIPTION, &mut r.offense_description, NOT_SPECIFIED);
    report.fill(col::OFFENSE_CATEGORY, &mut r.offense_category, NOT_SPECIFIED);
    report.fill(col::ARREST_BOROUGH, &mut r.arrest_borough, UNKNOWN);
    report.fill(col::AGE_GROUP, &mut r.age_group, UNKNOWN_AGE_GROUP);
}

fn fill_nypd_coordinates(r: &mut NypdRecord, report: &mut CleaningReport) {
    report.fill(col::X_COORDINATE, &mut r.x_coordinate, MISSING_COORDINATE);
    report.fill(col::Y_COORDINATE, &mut r.y_coordinate, MISSING_COORDINATE);
    report.fill(col::LATITUDE, &mut r.latitude, MISSING_COORDINATE);
    report.fill(col::LONGITUDE, &mut r.longitude, MISSING_COORDINATE);
}

fn fill_lapd(r: &mut LapdRecord, report: &mut CleaningReport) {
    report.fill(col::CHARGE_GROUP_CODE, &mut r.charge_group_code, MISSING_CODE);
    report.fill(col::CHARGE_GROUP_DESCRIPTION, &mut r.charge_group_description, NOT_SPECIFIED);
    report.fill(col::CHARGE_CODE, &mut r.charge_code, UNKNOWN);
    report.fill(col::CHARGE_DESCRIPTION, &mut r.charge_description, NOT_SPECIFIED);
    report.fill(col::ARREST_TYPE_CODE, &mut r.arrest_type_code, UNKNOWN);
    report.fill(col::DISPOSITION_DESCRIPTION, &mut r.disposition_description, UNKNOWN);
    report.fill(col::ARREST_TIME, &mut r.arrest_time, MISSING_CODE);
    report.fill(col::CROSS_STREET, &mut r.cross_street, NOT_SPECIFIED);
    report.fill(col::BOOKING_DATE, &mut r.booking_date, UNKNOWN);
    report.fill(col::BOOKING_TIME, &mut r.booking_time, MISSING_CODE);
    report.fill(col::BOOKING_LOCATION, &mut r.booking_location, UNKNOWN);
    report.fill(col::BOOKING_LOCATION_CODE, &mut r.booking_location_code, MISSING_CODE);
}

pub fn clean_nypd(records: &[NypdRecord]) -> (Vec<NypdRecord>, CleaningReport) {
    let mut report = CleaningReport::new(Department::Nypd, records.len());
    let mut out = records.to_vec();

    for record in out.iter_mut() {
        fill_nypd(record, &mut report);
    }

    if let Err(e) = derive_date_parts(&mut out) {
        report.date_error = Some(e);
    }

    for record in out.iter_mut() {
        fill_nypd_coordinates(record, &mut report);
    }

    report.rows_out = out.len();
    report.log();
    (out, report)
}

pub fn clean_lapd(records: &[LapdRecord]) -> (Vec<LapdRecord>, CleaningReport) {
    let mut report = CleaningReport::new(Department::Lapd, records.len());
    let mut out = records.to_vec();

    for record in out.iter_mut() {
        fill_lapd(record, &mut report);
        if null_invalid_age(record) {
            report.invalid_ages += 1;
        }
    }

    if let Err(e) = derive_date_parts(&mut out) {
        report.date_error = Some(e);
    }

    let before = out.len();
    out = dedup_records(out);
    report.duplicates_removed = before - out.len();

    report.rows_out = out.len();
    report.log();
    (out, report)
}

/// Ages outside [0, 100] are a data-quality signal: set to missing, not clamped.
/// Returns whether the age was cleared.
fn null_invalid_age(record: &mut LapdRecord) -> bool {
    let (lo, hi) = VALID_AGE_RANGE;
    match record.age {
        Some(age) if age < lo || age > hi => {
            record.age = None;
            true
        }
        _ => false,
    }
}

/// Drop exact duplicates, keeping the first occurrence
fn dedup_records(records: Vec<LapdRecord>) -> Vec<LapdRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.fingerprint()))
        .collect()
}

// ============================================================================
// DATES
// ============================================================================

/// Parse one arrest date in any of the accepted formats
pub fn parse_arrest_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parse every `Arrest_Date` and store year, month and day.
///
/// All-or-nothing over the set: missing dates yield missing parts, but a single
/// unparsable value fails the whole set and nothing is derived.
pub fn derive_date_parts<R: DepartmentRecord>(records: &mut [R]) -> Result<(), DateParseError> {
    let mut dates: Vec<Option<NaiveDate>> = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let parsed = match record.arrest_date() {
            None => None,
            Some(raw) => Some(parse_arrest_date(raw).ok_or_else(|| DateParseError::Unparsable {
                row,
                value: raw.to_string(),
            })?),
        };
        dates.push(parsed);
    }

    for (record, date) in records.iter_mut().zip(dates) {
        record.set_date_parts(date.map(|d| (d.year(), d.month(), d.day())));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
