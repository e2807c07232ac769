// 📂 CSV Load / Save - delimited files in, typed records out
// Load failures are logged and surfaced as `None` ("no data available")

use crate::align::{is_pre_aligned, COMMON_COLUMNS};
use crate::records::{AlignedRecord, Dataset};
use crate::schema::normalize_headers;
use crate::source::DepartmentRecord;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read one department's CSV into typed records.
///
/// Headers are renamed to canonical column names first. A file that already
/// carries the aligned schema (a previous export) is read as `AlignedRecord`s.
/// Any unparsable row fails the whole read.
pub fn read_dataset<R, Rd>(input: Rd) -> Result<Dataset<R>>
where
    R: DepartmentRecord,
    Rd: Read,
{
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    let raw_headers: StringRecord = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}'))
        .collect();

    if is_pre_aligned(&raw_headers) {
        reader.set_headers(raw_headers);
        let mut records = Vec::new();
        for (line_num, result) in reader.deserialize::<AlignedRecord>().enumerate() {
            let record = result.with_context(|| format!("Failed to parse CSV line {}", line_num + 2))?;
            records.push(record);
        }
        log::info!("{}: input is already aligned", R::DEPARTMENT.code());
        return Ok(Dataset::Aligned(records));
    }

    reader.set_headers(normalize_headers(&raw_headers, R::DEPARTMENT));
    let mut records = Vec::new();
    for (line_num, result) in reader.deserialize::<R>().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV line {}", line_num + 2))?;
        records.push(record);
    }
    Ok(Dataset::Raw(records))
}

pub fn load_dataset<R: DepartmentRecord>(path: &Path) -> Result<Dataset<R>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    read_dataset(file).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load a department file, logging and swallowing any failure
pub fn load_records<R: DepartmentRecord>(path: &Path) -> Option<Dataset<R>> {
    match load_dataset::<R>(path) {
        Ok(dataset) => {
            log::info!(
                "Data successfully loaded from {} ({} {} rows)",
                path.display(),
                dataset.len(),
                R::DEPARTMENT.code()
            );
            Some(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {}: {:#}", path.display(), e);
            None
        }
    }
}

/// Write aligned rows as CSV; the header row is `COMMON_COLUMNS` even when empty
pub fn save_aligned(records: &[AlignedRecord], path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;

    writer
        .write_record(COMMON_COLUMNS)
        .context("Failed to write CSV header")?;

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    log::info!("Saved {} rows to {}", records.len(), path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{LapdRecord, NypdRecord};
    use crate::source::Department;
    use crate::vocabulary::OffenseCategory;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("arrest_compare_io_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_read_dataset_renames_and_types() {
        let csv_text = "\u{feff}ARREST_KEY,AGE_GROUP,Latitude,PERP_RACE\n1,25-44,40.71,\n2,NaN,,BLACK\n";

        let Dataset::Raw(records) = read_dataset::<NypdRecord, _>(csv_text.as_bytes()).unwrap() else {
            panic!("expected raw dataset");
        };

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age_group.as_deref(), Some("25-44"));
        assert_eq!(records[0].latitude, Some(40.71));
        assert_eq!(records[0].perp_race, None);
        assert_eq!(records[1].age_group, None);
        assert_eq!(records[1].latitude, None);
        assert_eq!(records[1].perp_race.as_deref(), Some("BLACK"));
    }

    #[test]
    fn test_malformed_number_fails_read() {
        let csv_text = "Age,Arrest Date\nabc,01/01/2020\n";
        assert!(read_dataset::<LapdRecord, _>(csv_text.as_bytes()).is_err());
    }

    #[test]
    fn test_pre_aligned_file_detected() {
        let csv_text = "Data_Source,Arrest_Year,Offense_Std,Latitude\nLAPD,2019,Drug Offense,34.05\n";

        let dataset = read_dataset::<LapdRecord, _>(csv_text.as_bytes()).unwrap();

        let Dataset::Aligned(records) = dataset else {
            panic!("expected aligned dataset");
        };
        assert_eq!(records[0].data_source, Department::Lapd);
        assert_eq!(records[0].arrest_year, Some(2019));
        assert_eq!(records[0].offense_std, Some(OffenseCategory::DrugOffense));
        assert_eq!(records[0].longitude, None);
    }

    #[test]
    fn test_load_records_missing_file_is_none() {
        let path = temp_path("does_not_exist.csv");
        assert!(load_records::<NypdRecord>(&path).is_none());
    }

    #[test]
    fn test_load_records_ragged_file_is_none() {
        let path = temp_path("ragged.csv");
        fs::write(&path, "A,B\n1,2\n3,4,5\n").unwrap();
        assert!(load_records::<LapdRecord>(&path).is_none());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let path = temp_path("save.csv");
        let records = vec![
            AlignedRecord {
                arrest_year: Some(2020),
                offense_std: Some(OffenseCategory::ViolentCrime),
                ..AlignedRecord::empty(Department::Nypd)
            },
            AlignedRecord::empty(Department::Nypd),
        ];

        save_aligned(&records, &path).unwrap();
        let header = fs::read_to_string(&path).unwrap();
        let loaded = load_dataset::<NypdRecord>(&path).unwrap();

        assert!(header.starts_with(&COMMON_COLUMNS.join(",")));
        assert_eq!(loaded, Dataset::Aligned(records));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_empty_keeps_header() {
        let path = temp_path("empty.csv");
        save_aligned(&[], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), COMMON_COLUMNS.join(","));

        fs::remove_file(&path).ok();
    }
}
