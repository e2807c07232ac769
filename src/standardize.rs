// 🔤 Category Standardizer - department codes → shared vocabularies
// Four independent mappings; each reads its own source field and writes one `_Std` field

use crate::records::{LapdRecord, NypdRecord};
use crate::rules::{OffenseClassifier, LAPD_OFFENSE_RULES, NYPD_OFFENSE_RULES};
use crate::vocabulary::{AgeCategory, Category, Gender, Race};

// ============================================================================
// LOOKUP TABLES
// ============================================================================

pub const NYPD_GENDER_CODES: &[(&str, Gender)] = &[
    ("M", Gender::Male),
    ("F", Gender::Female),
    ("U", Gender::Unknown),
];

pub const LAPD_GENDER_CODES: &[(&str, Gender)] = &[
    ("M", Gender::Male),
    ("F", Gender::Female),
    ("X", Gender::Unknown),
];

/// Matched against the uppercased NYPD race description
pub const NYPD_RACE_DESCRIPTIONS: &[(&str, Race)] = &[
    ("BLACK", Race::Black),
    ("WHITE", Race::White),
    ("WHITE HISPANIC", Race::Hispanic),
    ("BLACK HISPANIC", Race::Hispanic),
    ("ASIAN / PACIFIC ISLANDER", Race::AsianPacificIslander),
    ("AMERICAN INDIAN/ALASKAN NATIVE", Race::NativeAmerican),
    ("UNKNOWN", Race::Unknown),
];

pub const LAPD_DESCENT_CODES: &[(&str, Race)] = &[
    ("H", Race::Hispanic),
    ("B", Race::Black),
    ("W", Race::White),
    ("A", Race::AsianPacificIslander),
    ("C", Race::AsianPacificIslander),
    ("J", Race::AsianPacificIslander),
    ("K", Race::AsianPacificIslander),
    ("L", Race::AsianPacificIslander),
    ("V", Race::AsianPacificIslander),
    ("F", Race::AsianPacificIslander),
    ("D", Race::AsianPacificIslander),
    ("I", Race::NativeAmerican),
    ("O", Race::Other),
    ("X", Race::Unknown),
    ("Z", Race::Unknown),
];

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Copy-on-transform over a record set
fn map_records<R: Clone>(records: &[R], f: impl Fn(&mut R)) -> Vec<R> {
    records
        .iter()
        .map(|record| {
            let mut out = record.clone();
            f(&mut out);
            out
        })
        .collect()
}

// ============================================================================
// AGE
// ============================================================================

/// Bucket a numeric age onto the NYPD age groups.
/// Missing or negative ages are `UNKNOWN`.
pub fn convert_numeric_age_to_category(age: Option<f64>) -> AgeCategory {
    match age {
        Some(a) if a.is_nan() || a < 0.0 => AgeCategory::Unknown,
        None => AgeCategory::Unknown,
        Some(a) if a < 18.0 => AgeCategory::Under18,
        Some(a) if a <= 24.0 => AgeCategory::From18To24,
        Some(a) if a < 25.0 => AgeCategory::Unknown,
        Some(a) if a <= 44.0 => AgeCategory::From25To44,
        Some(a) if a < 45.0 => AgeCategory::Unknown,
        Some(a) if a <= 64.0 => AgeCategory::From45To64,
        Some(a) if a < 65.0 => AgeCategory::Unknown,
        Some(_) => AgeCategory::Over65,
    }
}

/// NYPD's native bucket is the standard; anything outside the six buckets is coerced
/// to `UNKNOWN` in `Age_Group` before being copied.
pub fn standardize_nypd_age(records: &[NypdRecord]) -> Vec<NypdRecord> {
    map_records(records, |r| {
        let category = r
            .age_group
            .as_deref()
            .and_then(|s| AgeCategory::from_label(s.trim()))
            .unwrap_or(AgeCategory::Unknown);
        r.age_group = Some(category.label().to_string());
        r.age_category_std = Some(category);
    })
}

pub fn standardize_lapd_age(records: &[LapdRecord]) -> Vec<LapdRecord> {
    map_records(records, |r| {
        r.age_category_std = Some(convert_numeric_age_to_category(r.age));
    })
}

// ============================================================================
// GENDER
// ============================================================================

fn gender_from_code(table: &[(&str, Gender)], code: Option<&str>) -> Gender {
    code.and_then(|c| lookup(table, c.trim())).unwrap_or(Gender::Unknown)
}

pub fn standardize_nypd_gender(records: &[NypdRecord]) -> Vec<NypdRecord> {
    map_records(records, |r| {
        r.gender_std = Some(gender_from_code(NYPD_GENDER_CODES, r.perp_sex.as_deref()));
    })
}

pub fn standardize_lapd_gender(records: &[LapdRecord]) -> Vec<LapdRecord> {
    map_records(records, |r| {
        r.gender_std = Some(gender_from_code(LAPD_GENDER_CODES, r.perp_sex_code.as_deref()));
    })
}

// ============================================================================
// RACE
// ============================================================================

pub fn standardize_nypd_race(records: &[NypdRecord]) -> Vec<NypdRecord> {
    map_records(records, |r| {
        let race = r
            .perp_race
            .as_deref()
            .and_then(|desc| lookup(NYPD_RACE_DESCRIPTIONS, &desc.trim().to_uppercase()))
            .unwrap_or(Race::Unknown);
        r.race_std = Some(race);
    })
}

pub fn standardize_lapd_race(records: &[LapdRecord]) -> Vec<LapdRecord> {
    map_records(records, |r| {
        let race = r
            .perp_descent_code
            .as_deref()
            .and_then(|code| lookup(LAPD_DESCENT_CODES, code.trim()))
            .unwrap_or(Race::Unknown);
        r.race_std = Some(race);
    })
}

// ============================================================================
// OFFENSE
// ============================================================================

const NYPD_OFFENSES: OffenseClassifier = OffenseClassifier::new(NYPD_OFFENSE_RULES);
const LAPD_OFFENSES: OffenseClassifier = OffenseClassifier::new(LAPD_OFFENSE_RULES);

pub fn standardize_nypd_offense(records: &[NypdRecord]) -> Vec<NypdRecord> {
    map_records(records, |r| {
        let description = r.offense_category.as_deref().unwrap_or_default();
        r.offense_std = Some(NYPD_OFFENSES.classify(description));
    })
}

pub fn standardize_lapd_offense(records: &[LapdRecord]) -> Vec<LapdRecord> {
    map_records(records, |r| {
        let description = r.charge_group_description.as_deref().unwrap_or_default();
        r.offense_std = Some(LAPD_OFFENSES.classify(description));
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::OffenseCategory;

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_convert_numeric_age_boundaries() {
        let cases = [
            (17.0, AgeCategory::Under18),
            (18.0, AgeCategory::From18To24),
            (24.0, AgeCategory::From18To24),
            (25.0, AgeCategory::From25To44),
            (44.0, AgeCategory::From25To44),
            (45.0, AgeCategory::From45To64),
            (64.0, AgeCategory::From45To64),
            (65.0, AgeCategory::Over65),
        ];
        for (age, expected) in cases {
            assert_eq!(convert_numeric_age_to_category(Some(age)), expected, "age {age}");
        }
    }

    #[test]
    fn test_convert_numeric_age_unknowns() {
        assert_eq!(convert_numeric_age_to_category(Some(-5.0)), AgeCategory::Unknown);
        assert_eq!(convert_numeric_age_to_category(None), AgeCategory::Unknown);
        assert_eq!(convert_numeric_age_to_category(Some(f64::NAN)), AgeCategory::Unknown);
        assert_eq!(convert_numeric_age_to_category(Some(20.0)), AgeCategory::From18To24);
        assert_eq!(convert_numeric_age_to_category(Some(10.0)), AgeCategory::Under18);
    }

    #[test]
    fn test_nypd_age_coerces_unknown_buckets() {
        let records: Vec<NypdRecord> = [text("25-44"), text("1020"), None]
            .into_iter()
            .map(|age_group| NypdRecord {
                age_group,
                ..Default::default()
            })
            .collect();

        let out = standardize_nypd_age(&records);

        assert_eq!(out[0].age_category_std, Some(AgeCategory::From25To44));
        assert_eq!(out[1].age_category_std, Some(AgeCategory::Unknown));
        assert_eq!(out[1].age_group, text("UNKNOWN"));
        assert_eq!(out[2].age_category_std, Some(AgeCategory::Unknown));
        // input untouched
        assert_eq!(records[1].age_group, text("1020"));
    }

    #[test]
    fn test_lapd_age_from_numbers() {
        let records: Vec<LapdRecord> = [Some(30.0), None, Some(70.0)]
            .into_iter()
            .map(|age| LapdRecord {
                age,
                ..Default::default()
            })
            .collect();

        let out = standardize_lapd_age(&records);

        let categories: Vec<_> = out.iter().map(|r| r.age_category_std).collect();
        assert_eq!(
            categories,
            vec![Some(AgeCategory::From25To44), Some(AgeCategory::Unknown), Some(AgeCategory::Over65)]
        );
        // source field is kept
        assert_eq!(out[0].age, Some(30.0));
    }

    #[test]
    fn test_gender_codes_per_department() {
        let nypd: Vec<NypdRecord> = [text("M"), text("F"), text("X"), None]
            .into_iter()
            .map(|perp_sex| NypdRecord {
                perp_sex,
                ..Default::default()
            })
            .collect();
        let labels: Vec<&str> = standardize_nypd_gender(&nypd)
            .iter()
            .filter_map(|r| r.gender_std.map(|g| g.label()))
            .collect();
        assert_eq!(labels, vec!["Male", "Female", "Unknown", "Unknown"]);

        let lapd: Vec<LapdRecord> = [text("X"), text("F")]
            .into_iter()
            .map(|perp_sex_code| LapdRecord {
                perp_sex_code,
                ..Default::default()
            })
            .collect();
        let out = standardize_lapd_gender(&lapd);
        assert_eq!(out[0].gender_std, Some(Gender::Unknown));
        assert_eq!(out[1].gender_std, Some(Gender::Female));
    }

    #[test]
    fn test_nypd_race_collapses_hispanic() {
        let records: Vec<NypdRecord> = ["WHITE HISPANIC", "Black Hispanic", "BLACK", "MARTIAN"]
            .into_iter()
            .map(|race| NypdRecord {
                perp_race: text(race),
                ..Default::default()
            })
            .collect();
        let labels: Vec<&str> = standardize_nypd_race(&records)
            .iter()
            .filter_map(|r| r.race_std.map(|race| race.label()))
            .collect();
        assert_eq!(labels, vec!["Hispanic", "Hispanic", "Black", "Unknown"]);
    }

    #[test]
    fn test_lapd_descent_codes() {
        let records: Vec<LapdRecord> = [text("K"), text("O"), text("I"), text("Q"), None]
            .into_iter()
            .map(|perp_descent_code| LapdRecord {
                perp_descent_code,
                ..Default::default()
            })
            .collect();
        let labels: Vec<&str> = standardize_lapd_race(&records)
            .iter()
            .filter_map(|r| r.race_std.map(|race| race.label()))
            .collect();
        assert_eq!(
            labels,
            vec!["Asian/Pacific Islander", "Other", "Native American", "Unknown", "Unknown"]
        );
    }

    #[test]
    fn test_offense_without_description_is_other() {
        let out = standardize_lapd_offense(&[LapdRecord::default()]);
        assert_eq!(out[0].offense_std, Some(OffenseCategory::Other));
    }

    #[test]
    fn test_nypd_offense_keywords() {
        let records: Vec<NypdRecord> = ["DANGEROUS DRUGS", "PETIT LARCENY", "Not Specified"]
            .into_iter()
            .map(|desc| NypdRecord {
                offense_category: text(desc),
                ..Default::default()
            })
            .collect();
        let labels: Vec<&str> = standardize_nypd_offense(&records)
            .iter()
            .filter_map(|r| r.offense_std.map(|o| o.label()))
            .collect();
        assert_eq!(labels, vec!["Drug Offense", "Property Crime", "Other"]);
    }
}
