// 📐 Schema Normalizer - raw department headers → standardized column vocabulary
// Rename is purely key-based: unmapped columns pass through, absent keys are ignored

use crate::source::Department;
use csv::StringRecord;

/// Canonical column names used after normalization
pub mod col {
    pub const ID: &str = "ID";
    pub const ARREST_DATE: &str = "Arrest_Date";
    pub const ARREST_YEAR: &str = "Arrest_Year";
    pub const ARREST_MONTH: &str = "Arrest_Month";
    pub const ARREST_DAY: &str = "Arrest_Day";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const DATA_SOURCE: &str = "Data_Source";

    pub const GENDER_STD: &str = "Gender_Std";
    pub const RACE_STD: &str = "Race_Std";
    pub const AGE_CATEGORY_STD: &str = "Age_Category_Std";
    pub const OFFENSE_STD: &str = "Offense_Std";

    // NYPD
    pub const PD_CODE: &str = "PD_Code";
    pub const OFFENSE_DESCRIPTION: &str = "Offense_Description";
    pub const KY_CODE: &str = "KY_Code";
    pub const OFFENSE_CATEGORY: &str = "Offense_Category";
    pub const LAW_CODE: &str = "Law_Code";
    pub const LAW_CATEGORY: &str = "Law_Category";
    pub const ARREST_BOROUGH: &str = "Arrest_Borough";
    pub const AGE_GROUP: &str = "Age_Group";
    pub const PERP_SEX: &str = "Perp_Sex";
    pub const PERP_RACE: &str = "Perp_Race";
    pub const X_COORDINATE: &str = "X_Coordinate";
    pub const Y_COORDINATE: &str = "Y_Coordinate";

    // LAPD
    pub const ARREST_TIME: &str = "Arrest_Time";
    pub const AGE: &str = "Age";
    pub const PERP_SEX_CODE: &str = "Perp_Sex_Code";
    pub const PERP_DESCENT_CODE: &str = "Perp_Descent_Code";
    pub const CHARGE_GROUP_CODE: &str = "Charge_Group_Code";
    pub const CHARGE_GROUP_DESCRIPTION: &str = "Charge_Group_Description";
    pub const ARREST_TYPE_CODE: &str = "Arrest_Type_Code";
    pub const CHARGE_CODE: &str = "Charge_Code";
    pub const CHARGE_DESCRIPTION: &str = "Charge_Description";
    pub const DISPOSITION_DESCRIPTION: &str = "Disposition_Description";
    pub const CROSS_STREET: &str = "Cross_Street";
    pub const BOOKING_DATE: &str = "Booking_Date";
    pub const BOOKING_TIME: &str = "Booking_Time";
    pub const BOOKING_LOCATION: &str = "Booking_Location";
    pub const BOOKING_LOCATION_CODE: &str = "Booking_Location_Code";
}

pub const NYPD_COLUMN_MAP: &[(&str, &str)] = &[
    ("ARREST_KEY", col::ID),
    ("ARREST_DATE", col::ARREST_DATE),
    ("PD_CD", col::PD_CODE),
    ("PD_DESC", col::OFFENSE_DESCRIPTION),
    ("KY_CD", col::KY_CODE),
    ("OFNS_DESC", col::OFFENSE_CATEGORY),
    ("LAW_CODE", col::LAW_CODE),
    ("LAW_CAT_CD", col::LAW_CATEGORY),
    ("ARREST_BORO", col::ARREST_BOROUGH),
    ("ARREST_PRECINCT", "Arrest_Precinct"),
    ("JURISDICTION_CODE", "Jurisdiction_Code"),
    ("AGE_GROUP", col::AGE_GROUP),
    ("PERP_SEX", col::PERP_SEX),
    ("PERP_RACE", col::PERP_RACE),
    ("X_COORD_CD", col::X_COORDINATE),
    ("Y_COORD_CD", col::Y_COORDINATE),
    ("Latitude", col::LATITUDE),
    ("Longitude", col::LONGITUDE),
    ("Lon_Lat", "Location_Point"),
];

pub const LAPD_COLUMN_MAP: &[(&str, &str)] = &[
    ("Report ID", col::ID),
    ("Report Type", "Report_Type"),
    ("Arrest Date", col::ARREST_DATE),
    ("Time", col::ARREST_TIME),
    ("Area ID", "Area_ID"),
    ("Area Name", "Area_Name"),
    ("Reporting District", "Reporting_District"),
    ("Age", col::AGE),
    ("Sex Code", col::PERP_SEX_CODE),
    ("Descent Code", col::PERP_DESCENT_CODE),
    ("Charge Group Code", col::CHARGE_GROUP_CODE),
    ("Charge Group Description", col::CHARGE_GROUP_DESCRIPTION),
    ("Arrest Type Code", col::ARREST_TYPE_CODE),
    ("Charge", col::CHARGE_CODE),
    ("Charge Description", col::CHARGE_DESCRIPTION),
    ("Disposition Description", col::DISPOSITION_DESCRIPTION),
    ("Address", "Arrest_Address"),
    ("Cross Street", col::CROSS_STREET),
    ("LAT", col::LATITUDE),
    ("LON", col::LONGITUDE),
    ("Location", "Location_Point"),
    ("Booking Date", col::BOOKING_DATE),
    ("Booking Time", col::BOOKING_TIME),
    ("Booking Location", col::BOOKING_LOCATION),
    ("Booking Location Code", col::BOOKING_LOCATION_CODE),
];

pub fn column_map(department: Department) -> &'static [(&'static str, &'static str)] {
    match department {
        Department::Nypd => NYPD_COLUMN_MAP,
        Department::Lapd => LAPD_COLUMN_MAP,
    }
}

/// Rename a raw department header row to the standardized vocabulary.
/// Position and count of columns are untouched, so every data row still lines up.
pub fn normalize_headers(raw: &StringRecord, department: Department) -> StringRecord {
    let map = column_map(department);
    let renamed: StringRecord = raw
        .iter()
        .map(|header| {
            let header = header.trim_start_matches('\u{feff}');
            map.iter()
                .find(|(from, _)| *from == header)
                .map(|(_, to)| *to)
                .unwrap_or(header)
        })
        .collect();

    let mapped = raw.iter().zip(renamed.iter()).filter(|(a, b)| a != b).count();
    log::debug!(
        "{}: normalized {} of {} columns",
        department.code(),
        mapped,
        renamed.len()
    );
    renamed
}
