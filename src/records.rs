// 📋 Arrest Records - typed rows for each department and for the aligned schema
// Field names follow the standardized column vocabulary; serde maps them to CSV headers

use crate::source::Department;
use crate::vocabulary::{AgeCategory, Gender, OffenseCategory, Race};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// NULL-AWARE FIELD PARSING
// ============================================================================

/// Lenient CSV field parsing. Empty cells and the usual null tokens read as
/// missing; anything else must parse or the whole load fails.
pub mod nullable {
    use crate::vocabulary::Category;
    use serde::de::{self, Deserialize, Deserializer};

    pub const NULL_TOKENS: &[&str] = &[
        "", "NaN", "-NaN", "nan", "-nan", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "None",
        "<NA>",
    ];

    pub fn is_null_token(raw: &str) -> bool {
        NULL_TOKENS.contains(&raw.trim())
    }

    fn present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.filter(|s| !is_null_token(s)))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        present(deserializer)
    }

    pub fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = present(deserializer)? else {
            return Ok(None);
        };
        raw.trim()
            .parse::<f64>()
            .map(|v| Some(v).filter(|v| !v.is_nan()))
            .map_err(|_| de::Error::custom(format!("invalid number: {raw:?}")))
    }

    /// Whole numbers, including float renderings such as "2020.0"
    pub fn int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let Some(raw) = present(deserializer)? else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid integer: {raw:?}")))
    }

    pub fn category<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Category,
    {
        let Some(raw) = present(deserializer)? else {
            return Ok(None);
        };
        T::from_label(raw.trim())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown category label: {raw:?}")))
    }
}

// ============================================================================
// NYPD
// ============================================================================

/// One NYPD arrest after header normalization.
/// Date parts and `_Std` fields are derived by the pipeline, never read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NypdRecord {
    #[serde(rename = "ID", deserialize_with = "nullable::int")]
    pub id: Option<i64>,

    #[serde(rename = "Arrest_Date", deserialize_with = "nullable::text")]
    pub arrest_date: Option<String>,

    #[serde(rename = "PD_Code", deserialize_with = "nullable::int")]
    pub pd_code: Option<i64>,

    #[serde(rename = "Offense_Description", deserialize_with = "nullable::text")]
    pub offense_description: Option<String>,

    #[serde(rename = "KY_Code", deserialize_with = "nullable::int")]
    pub ky_code: Option<i64>,

    #[serde(rename = "Offense_Category", deserialize_with = "nullable::text")]
    pub offense_category: Option<String>,

    #[serde(rename = "Law_Code", deserialize_with = "nullable::text")]
    pub law_code: Option<String>,

    #[serde(rename = "Law_Category", deserialize_with = "nullable::text")]
    pub law_category: Option<String>,

    #[serde(rename = "Arrest_Borough", deserialize_with = "nullable::text")]
    pub arrest_borough: Option<String>,

    #[serde(rename = "Arrest_Precinct", deserialize_with = "nullable::int")]
    pub arrest_precinct: Option<i64>,

    #[serde(rename = "Jurisdiction_Code", deserialize_with = "nullable::int")]
    pub jurisdiction_code: Option<i64>,

    #[serde(rename = "Age_Group", deserialize_with = "nullable::text")]
    pub age_group: Option<String>,

    #[serde(rename = "Perp_Sex", deserialize_with = "nullable::text")]
    pub perp_sex: Option<String>,

    #[serde(rename = "Perp_Race", deserialize_with = "nullable::text")]
    pub perp_race: Option<String>,

    #[serde(rename = "X_Coordinate", deserialize_with = "nullable::float")]
    pub x_coordinate: Option<f64>,

    #[serde(rename = "Y_Coordinate", deserialize_with = "nullable::float")]
    pub y_coordinate: Option<f64>,

    #[serde(rename = "Latitude", deserialize_with = "nullable::float")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", deserialize_with = "nullable::float")]
    pub longitude: Option<f64>,

    #[serde(rename = "Location_Point", deserialize_with = "nullable::text")]
    pub location_point: Option<String>,

    // ========================================================================
    // DERIVED
    // ========================================================================
    #[serde(rename = "Arrest_Year", skip_deserializing)]
    pub arrest_year: Option<i32>,

    #[serde(rename = "Arrest_Month", skip_deserializing)]
    pub arrest_month: Option<u32>,

    #[serde(rename = "Arrest_Day", skip_deserializing)]
    pub arrest_day: Option<u32>,

    #[serde(rename = "Gender_Std", skip_deserializing)]
    pub gender_std: Option<Gender>,

    #[serde(rename = "Race_Std", skip_deserializing)]
    pub race_std: Option<Race>,

    #[serde(rename = "Age_Category_Std", skip_deserializing)]
    pub age_category_std: Option<AgeCategory>,

    #[serde(rename = "Offense_Std", skip_deserializing)]
    pub offense_std: Option<OffenseCategory>,
}

// ============================================================================
// LAPD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapdRecord {
    #[serde(rename = "ID", deserialize_with = "nullable::int")]
    pub id: Option<i64>,

    #[serde(rename = "Report_Type", deserialize_with = "nullable::text")]
    pub report_type: Option<String>,

    #[serde(rename = "Arrest_Date", deserialize_with = "nullable::text")]
    pub arrest_date: Option<String>,

    /// 24h clock as an integer, e.g. 1530
    #[serde(rename = "Arrest_Time", deserialize_with = "nullable::int")]
    pub arrest_time: Option<i64>,

    #[serde(rename = "Area_ID", deserialize_with = "nullable::int")]
    pub area_id: Option<i64>,

    #[serde(rename = "Area_Name", deserialize_with = "nullable::text")]
    pub area_name: Option<String>,

    #[serde(rename = "Reporting_District", deserialize_with = "nullable::int")]
    pub reporting_district: Option<i64>,

    #[serde(rename = "Age", deserialize_with = "nullable::float")]
    pub age: Option<f64>,

    #[serde(rename = "Perp_Sex_Code", deserialize_with = "nullable::text")]
    pub perp_sex_code: Option<String>,

    #[serde(rename = "Perp_Descent_Code", deserialize_with = "nullable::text")]
    pub perp_descent_code: Option<String>,

    #[serde(rename = "Charge_Group_Code", deserialize_with = "nullable::int")]
    pub charge_group_code: Option<i64>,

    #[serde(rename = "Charge_Group_Description", deserialize_with = "nullable::text")]
    pub charge_group_description: Option<String>,

    #[serde(rename = "Arrest_Type_Code", deserialize_with = "nullable::text")]
    pub arrest_type_code: Option<String>,

    #[serde(rename = "Charge_Code", deserialize_with = "nullable::text")]
    pub charge_code: Option<String>,

    #[serde(rename = "Charge_Description", deserialize_with = "nullable::text")]
    pub charge_description: Option<String>,

    #[serde(rename = "Disposition_Description", deserialize_with = "nullable::text")]
    pub disposition_description: Option<String>,

    #[serde(rename = "Arrest_Address", deserialize_with = "nullable::text")]
    pub arrest_address: Option<String>,

    #[serde(rename = "Cross_Street", deserialize_with = "nullable::text")]
    pub cross_street: Option<String>,

    #[serde(rename = "Latitude", deserialize_with = "nullable::float")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", deserialize_with = "nullable::float")]
    pub longitude: Option<f64>,

    #[serde(rename = "Location_Point", deserialize_with = "nullable::text")]
    pub location_point: Option<String>,

    #[serde(rename = "Booking_Date", deserialize_with = "nullable::text")]
    pub booking_date: Option<String>,

    #[serde(rename = "Booking_Time", deserialize_with = "nullable::int")]
    pub booking_time: Option<i64>,

    #[serde(rename = "Booking_Location", deserialize_with = "nullable::text")]
    pub booking_location: Option<String>,

    #[serde(rename = "Booking_Location_Code", deserialize_with = "nullable::int")]
    pub booking_location_code: Option<i64>,

    // ========================================================================
    // DERIVED
    // ========================================================================
    #[serde(rename = "Arrest_Year", skip_deserializing)]
    pub arrest_year: Option<i32>,

    #[serde(rename = "Arrest_Month", skip_deserializing)]
    pub arrest_month: Option<u32>,

    #[serde(rename = "Arrest_Day", skip_deserializing)]
    pub arrest_day: Option<u32>,

    #[serde(rename = "Gender_Std", skip_deserializing)]
    pub gender_std: Option<Gender>,

    #[serde(rename = "Race_Std", skip_deserializing)]
    pub race_std: Option<Race>,

    #[serde(rename = "Age_Category_Std", skip_deserializing)]
    pub age_category_std: Option<AgeCategory>,

    #[serde(rename = "Offense_Std", skip_deserializing)]
    pub offense_std: Option<OffenseCategory>,
}

impl LapdRecord {
    /// Hash over every field, for exact-duplicate detection
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(self) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => hasher.update(format!("{:?}", self).as_bytes()),
        }
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// ALIGNED
// ============================================================================

/// One row of the common comparison schema. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    #[serde(rename = "Data_Source")]
    pub data_source: Department,

    #[serde(rename = "Arrest_Year", default, deserialize_with = "nullable::int")]
    pub arrest_year: Option<i32>,

    #[serde(rename = "Arrest_Month", default, deserialize_with = "nullable::int")]
    pub arrest_month: Option<u32>,

    #[serde(rename = "Arrest_Day", default, deserialize_with = "nullable::int")]
    pub arrest_day: Option<u32>,

    #[serde(rename = "Gender_Std", default, deserialize_with = "nullable::category")]
    pub gender_std: Option<Gender>,

    #[serde(rename = "Race_Std", default, deserialize_with = "nullable::category")]
    pub race_std: Option<Race>,

    #[serde(rename = "Age_Category_Std", default, deserialize_with = "nullable::category")]
    pub age_category_std: Option<AgeCategory>,

    #[serde(rename = "Offense_Std", default, deserialize_with = "nullable::category")]
    pub offense_std: Option<OffenseCategory>,

    #[serde(rename = "Latitude", default, deserialize_with = "nullable::float")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default, deserialize_with = "nullable::float")]
    pub longitude: Option<f64>,
}

impl AlignedRecord {
    /// Every common field missing except the source tag
    pub fn empty(data_source: Department) -> Self {
        AlignedRecord {
            data_source,
            arrest_year: None,
            arrest_month: None,
            arrest_day: None,
            gender_std: None,
            race_std: None,
            age_category_std: None,
            offense_std: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A loaded department file: raw department rows, or rows already on the
/// common schema (a previous export)
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset<R> {
    Raw(Vec<R>),
    Aligned(Vec<AlignedRecord>),
}

impl<R> Dataset<R> {
    pub fn len(&self) -> usize {
        match self {
            Dataset::Raw(records) => records.len(),
            Dataset::Aligned(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self, Dataset::Aligned(_))
    }
}
