// 🔗 Dataset Aligner - project both departments onto one common schema
// Common fields a source never had stay present as missing values, never dropped

use crate::records::AlignedRecord;
use crate::schema::col;
use crate::source::DepartmentRecord;
use csv::StringRecord;

/// The aligned schema, in order. Matches the field order of `AlignedRecord`.
pub const COMMON_COLUMNS: [&str; 10] = [
    col::DATA_SOURCE,
    col::ARREST_YEAR,
    col::ARREST_MONTH,
    col::ARREST_DAY,
    col::GENDER_STD,
    col::RACE_STD,
    col::AGE_CATEGORY_STD,
    col::OFFENSE_STD,
    col::LATITUDE,
    col::LONGITUDE,
];

/// Columns whose presence marks a file as already aligned
pub const PRE_ALIGNED_MARKERS: [&str; 3] = [col::DATA_SOURCE, col::ARREST_YEAR, col::OFFENSE_STD];

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub nypd: Vec<AlignedRecord>,
    pub lapd: Vec<AlignedRecord>,
    pub common_columns: &'static [&'static str],
}

/// Tag one standardized set with its department and project it onto `COMMON_COLUMNS`
pub fn align_one<R: DepartmentRecord>(records: &[R]) -> Vec<AlignedRecord> {
    records.iter().map(R::to_aligned).collect()
}

/// Align both departments. Either input being absent (an upstream load failure)
/// makes the whole pair absent.
pub fn align_datasets<N, L>(nypd: Option<&[N]>, lapd: Option<&[L]>) -> Option<AlignedPair>
where
    N: DepartmentRecord,
    L: DepartmentRecord,
{
    let (nypd, lapd) = (nypd?, lapd?);
    let pair = AlignedPair {
        nypd: align_one(nypd),
        lapd: align_one(lapd),
        common_columns: &COMMON_COLUMNS,
    };

    for (records, department) in [(&pair.nypd, N::DEPARTMENT), (&pair.lapd, L::DEPARTMENT)] {
        let undated = records.iter().filter(|r| r.arrest_year.is_none()).count();
        if undated > 0 {
            log::warn!(
                "{}: {} of {} aligned rows have no Arrest_Year",
                department.code(),
                undated,
                records.len()
            );
        }
    }
    Some(pair)
}

pub fn is_pre_aligned(headers: &StringRecord) -> bool {
    PRE_ALIGNED_MARKERS
        .iter()
        .all(|marker| headers.iter().any(|h| h == *marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{LapdRecord, NypdRecord};
    use crate::source::Department;
    use crate::vocabulary::{Gender, OffenseCategory};

    fn nypd_row() -> NypdRecord {
        NypdRecord {
            arrest_year: Some(2020),
            arrest_month: Some(1),
            arrest_day: Some(1),
            gender_std: Some(Gender::Male),
            offense_std: Some(OffenseCategory::ViolentCrime),
            latitude: Some(40.7),
            longitude: Some(-73.9),
            perp_sex: Some("M".to_string()),
            ..Default::default()
        }
    }

    fn serialized_headers(records: &[AlignedRecord]) -> StringRecord {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in records {
            writer.serialize(record).unwrap();
        }
        let bytes = writer.into_inner().unwrap();
        csv::Reader::from_reader(bytes.as_slice()).headers().unwrap().clone()
    }

    #[test]
    fn test_aligned_schemas_match() {
        let pair = align_datasets(Some(&[nypd_row()][..]), Some(&[LapdRecord::default()][..])).unwrap();

        let expected = StringRecord::from(COMMON_COLUMNS.to_vec());
        assert_eq!(serialized_headers(&pair.nypd), expected);
        assert_eq!(serialized_headers(&pair.lapd), expected);
        assert_eq!(pair.common_columns, &COMMON_COLUMNS);
        assert_eq!(pair.nypd[0].data_source, Department::Nypd);
        assert_eq!(pair.lapd[0].data_source, Department::Lapd);
    }

    #[test]
    fn test_absent_common_field_is_missing() {
        let pair = align_datasets(Some(&[nypd_row()][..]), Some(&[LapdRecord::default()][..])).unwrap();

        assert_eq!(pair.lapd[0], AlignedRecord::empty(Department::Lapd));
        assert_eq!(pair.nypd[0].latitude, Some(40.7));
    }

    #[test]
    fn test_absent_input_propagates() {
        let lapd = [LapdRecord::default()];
        let nypd = [nypd_row()];
        assert!(align_datasets::<NypdRecord, LapdRecord>(None, Some(&lapd[..])).is_none());
        assert!(align_datasets::<NypdRecord, LapdRecord>(Some(&nypd[..]), None).is_none());
    }

    #[test]
    fn test_data_source_on_every_row() {
        let aligned = align_one(&vec![LapdRecord::default(); 5][..]);
        assert_eq!(aligned.len(), 5);
        assert!(aligned.iter().all(|r| r.data_source == Department::Lapd));
    }

    #[test]
    fn test_is_pre_aligned() {
        assert!(is_pre_aligned(&StringRecord::from(COMMON_COLUMNS.to_vec())));
        assert!(!is_pre_aligned(&StringRecord::from(vec!["ID", "Arrest_Year", "Offense_Std"])));
    }
}
