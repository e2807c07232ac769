// 🏗️ Department Strategies - one record type per police department
// Explicit enum tag + trait implemented per record type instead of name-based dispatch

use crate::cleaning::{clean_lapd, clean_nypd, CleaningReport};
use crate::records::{AlignedRecord, LapdRecord, NypdRecord};
use crate::standardize::*;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Department - which police department a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "NYPD")]
    Nypd,
    #[serde(rename = "LAPD")]
    Lapd,
}

impl Department {
    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Department::Nypd => "New York Police Department",
            Department::Lapd => "Los Angeles Police Department",
        }
    }

    /// Literal tag written into `Data_Source`
    pub fn code(&self) -> &'static str {
        match self {
            Department::Nypd => "NYPD",
            Department::Lapd => "LAPD",
        }
    }
}

// ============================================================================
// DEPARTMENT RECORD TRAIT
// ============================================================================

/// Per-department transformation steps. Set-level steps borrow their input and
/// return fresh records.
pub trait DepartmentRecord: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const DEPARTMENT: Department;

    /// Raw `Arrest_Date` text
    fn arrest_date(&self) -> Option<&str>;

    /// Store the parsed arrest date as year, month and day
    fn set_date_parts(&mut self, date: Option<(i32, u32, u32)>);

    /// Default-fill, date derivation, deduplication
    fn clean(records: &[Self]) -> (Vec<Self>, CleaningReport);

    fn standardize_age(records: &[Self]) -> Vec<Self>;
    fn standardize_gender(records: &[Self]) -> Vec<Self>;
    fn standardize_race(records: &[Self]) -> Vec<Self>;
    fn standardize_offense(records: &[Self]) -> Vec<Self>;

    /// Project onto the common schema, tagged with `DEPARTMENT`
    fn to_aligned(&self) -> AlignedRecord;

    /// All four category mappings; they are independent so order does not matter
    fn standardize(records: &[Self]) -> Vec<Self> {
        let records = Self::standardize_age(records);
        let records = Self::standardize_gender(&records);
        let records = Self::standardize_race(&records);
        Self::standardize_offense(&records)
    }

    /// clean → standardize
    fn process(records: &[Self]) -> (Vec<Self>, CleaningReport) {
        let (cleaned, report) = Self::clean(records);
        (Self::standardize(&cleaned), report)
    }
}

/// Guess the department from a file name (`nypd_*.csv`, `sample_lapd.csv`, ...)
pub fn detect_department(file_path: &Path) -> Result<Department> {
    let filename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    match (filename.contains("nypd"), filename.contains("lapd")) {
        (true, false) => Ok(Department::Nypd),
        (false, true) => Ok(Department::Lapd),
        (true, true) => anyhow::bail!(
            "File name mentions both departments: {}",
            file_path.display()
        ),
        (false, false) => anyhow::bail!(
            "Could not detect department from filename: {}",
            file_path.display()
        ),
    }
}

/// Order two input files as (NYPD, LAPD) by their file names
pub fn order_by_department(first: &Path, second: &Path) -> Result<(PathBuf, PathBuf)> {
    match (detect_department(first)?, detect_department(second)?) {
        (Department::Nypd, Department::Lapd) => Ok((first.to_path_buf(), second.to_path_buf())),
        (Department::Lapd, Department::Nypd) => Ok((second.to_path_buf(), first.to_path_buf())),
        (department, _) => anyhow::bail!(
            "Both files look like {} data; pass one NYPD and one LAPD file",
            department.code()
        ),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl DepartmentRecord for NypdRecord {
    const DEPARTMENT: Department = Department::Nypd;

    fn arrest_date(&self) -> Option<&str> {
        self.arrest_date.as_deref()
    }

    fn set_date_parts(&mut self, date: Option<(i32, u32, u32)>) {
        self.arrest_year = date.map(|d| d.0);
        self.arrest_month = date.map(|d| d.1);
        self.arrest_day = date.map(|d| d.2);
    }

    fn clean(records: &[Self]) -> (Vec<Self>, CleaningReport) {
        clean_nypd(records)
    }

    fn standardize_age(records: &[Self]) -> Vec<Self> {
        standardize_nypd_age(records)
    }

    fn standardize_gender(records: &[Self]) -> Vec<Self> {
        standardize_nypd_gender(records)
    }

    fn standardize_race(records: &[Self]) -> Vec<Self> {
        standardize_nypd_race(records)
    }

    fn standardize_offense(records: &[Self]) -> Vec<Self> {
        standardize_nypd_offense(records)
    }

    fn to_aligned(&self) -> AlignedRecord {
        AlignedRecord {
            data_source: Self::DEPARTMENT,
            arrest_year: self.arrest_year,
            arrest_month: self.arrest_month,
            arrest_day: self.arrest_day,
            gender_std: self.gender_std,
            race_std: self.race_std,
            age_category_std: self.age_category_std,
            offense_std: self.offense_std,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl DepartmentRecord for LapdRecord {
    const DEPARTMENT: Department = Department::Lapd;

    fn arrest_date(&self) -> Option<&str> {
        self.arrest_date.as_deref()
    }

    fn set_date_parts(&mut self, date: Option<(i32, u32, u32)>) {
        self.arrest_year = date.map(|d| d.0);
        self.arrest_month = date.map(|d| d.1);
        self.arrest_day = date.map(|d| d.2);
    }

    fn clean(records: &[Self]) -> (Vec<Self>, CleaningReport) {
        clean_lapd(records)
    }

    fn standardize_age(records: &[Self]) -> Vec<Self> {
        standardize_lapd_age(records)
    }

    fn standardize_gender(records: &[Self]) -> Vec<Self> {
        standardize_lapd_gender(records)
    }

    fn standardize_race(records: &[Self]) -> Vec<Self> {
        standardize_lapd_race(records)
    }

    fn standardize_offense(records: &[Self]) -> Vec<Self> {
        standardize_lapd_offense(records)
    }

    fn to_aligned(&self) -> AlignedRecord {
        AlignedRecord {
            data_source: Self::DEPARTMENT,
            arrest_year: self.arrest_year,
            arrest_month: self.arrest_month,
            arrest_day: self.arrest_day,
            gender_std: self.gender_std,
            race_std: self.race_std,
            age_category_std: self.age_category_std,
            offense_std: self.offense_std,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{AgeCategory, Gender, OffenseCategory, Race};

    #[test]
    fn test_department_codes() {
        assert_eq!(Department::Nypd.code(), "NYPD");
        assert_eq!(Department::Lapd.code(), "LAPD");
        assert_eq!(serde_json::to_string(&Department::Lapd).unwrap(), "\"LAPD\"");
        assert_eq!(Department::Nypd.name(), "New York Police Department");
    }

    #[test]
    fn test_detect_department() {
        assert_eq!(detect_department(Path::new("data/sample_nypd.csv")).unwrap(), Department::Nypd);
        assert_eq!(detect_department(Path::new("LAPD_Arrests_2019.csv")).unwrap(), Department::Lapd);
        assert!(detect_department(Path::new("arrests.csv")).is_err());
        assert!(detect_department(Path::new("nypd_vs_lapd.csv")).is_err());
    }

    #[test]
    fn test_order_by_department() {
        let (nypd, lapd) = order_by_department(Path::new("in/lapd_2019.csv"), Path::new("in/NYPD_2019.csv")).unwrap();
        assert_eq!(nypd, PathBuf::from("in/NYPD_2019.csv"));
        assert_eq!(lapd, PathBuf::from("in/lapd_2019.csv"));

        assert!(order_by_department(Path::new("nypd_a.csv"), Path::new("nypd_b.csv")).is_err());
        assert!(order_by_department(Path::new("nypd_a.csv"), Path::new("arrests.csv")).is_err());
    }

    #[test]
    fn test_standardize_order_insensitive() {
        let records = vec![LapdRecord {
            age: Some(19.0),
            perp_sex_code: Some("F".to_string()),
            perp_descent_code: Some("H".to_string()),
            charge_group_description: Some("Larceny Theft".to_string()),
            ..Default::default()
        }];

        let forward = LapdRecord::standardize(&records);
        let reverse = LapdRecord::standardize_age(&LapdRecord::standardize_gender(
            &LapdRecord::standardize_race(&LapdRecord::standardize_offense(&records)),
        ));

        assert_eq!(forward, reverse);
        assert_eq!(forward[0].offense_std, Some(OffenseCategory::PropertyCrime));
        assert_eq!(forward[0].age_category_std, Some(AgeCategory::From18To24));
        assert_eq!(forward[0].gender_std, Some(Gender::Female));
        assert_eq!(forward[0].race_std, Some(Race::Hispanic));
    }

    #[test]
    fn test_process_then_align_tags_department() {
        let records = vec![NypdRecord {
            arrest_date: Some("2020-01-01".to_string()),
            perp_sex: Some("M".to_string()),
            ..Default::default()
        }];

        let (standardized, report) = NypdRecord::process(&records);
        let aligned: Vec<AlignedRecord> = standardized.iter().map(|r| r.to_aligned()).collect();

        assert_eq!(report.department, Department::Nypd);
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].data_source, Department::Nypd);
        assert_eq!(aligned[0].arrest_year, Some(2020));
        assert_eq!(aligned[0].gender_std, Some(Gender::Male));
    }
}
