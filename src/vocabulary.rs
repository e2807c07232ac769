// 🏷️ Category Vocabulary - shared categorical labels for both departments
// Process-wide constants; NYPD's age buckets are the reference standard.
// Serialized form is the display label, so aligned CSV files read back as-is.

use serde::{Deserialize, Serialize};

/// A closed set of labels shared by both departments
pub trait Category: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

// ============================================================================
// AGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeCategory {
    #[serde(rename = "<18")]
    Under18,
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-44")]
    From25To44,
    #[serde(rename = "45-64")]
    From45To64,
    #[serde(rename = "65+")]
    Over65,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Category for AgeCategory {
    const ALL: &'static [AgeCategory] = &[
        AgeCategory::Under18,
        AgeCategory::From18To24,
        AgeCategory::From25To44,
        AgeCategory::From45To64,
        AgeCategory::Over65,
        AgeCategory::Unknown,
    ];

    fn label(&self) -> &'static str {
        match self {
            AgeCategory::Under18 => "<18",
            AgeCategory::From18To24 => "18-24",
            AgeCategory::From25To44 => "25-44",
            AgeCategory::From45To64 => "45-64",
            AgeCategory::Over65 => "65+",
            AgeCategory::Unknown => "UNKNOWN",
        }
    }
}

// ============================================================================
// GENDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Category for Gender {
    const ALL: &'static [Gender] = &[Gender::Male, Gender::Female, Gender::Unknown];

    fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// RACE / ETHNICITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Black,
    White,
    Hispanic,
    #[serde(rename = "Asian/Pacific Islander")]
    AsianPacificIslander,
    #[serde(rename = "Native American")]
    NativeAmerican,
    Other,
    Unknown,
}

impl Category for Race {
    const ALL: &'static [Race] = &[
        Race::Black,
        Race::Hispanic,
        Race::White,
        Race::AsianPacificIslander,
        Race::Other,
        Race::NativeAmerican,
        Race::Unknown,
    ];

    fn label(&self) -> &'static str {
        match self {
            Race::Black => "Black",
            Race::White => "White",
            Race::Hispanic => "Hispanic",
            Race::AsianPacificIslander => "Asian/Pacific Islander",
            Race::NativeAmerican => "Native American",
            Race::Other => "Other",
            Race::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// OFFENSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffenseCategory {
    #[serde(rename = "Violent Crime")]
    ViolentCrime,
    #[serde(rename = "Property Crime")]
    PropertyCrime,
    #[serde(rename = "Drug Offense")]
    DrugOffense,
    #[serde(rename = "Weapon Offense")]
    WeaponOffense,
    #[serde(rename = "Traffic Violation")]
    TrafficViolation,
    Other,
}

impl Category for OffenseCategory {
    const ALL: &'static [OffenseCategory] = &[
        OffenseCategory::ViolentCrime,
        OffenseCategory::PropertyCrime,
        OffenseCategory::DrugOffense,
        OffenseCategory::WeaponOffense,
        OffenseCategory::TrafficViolation,
        OffenseCategory::Other,
    ];

    fn label(&self) -> &'static str {
        match self {
            OffenseCategory::ViolentCrime => "Violent Crime",
            OffenseCategory::PropertyCrime => "Property Crime",
            OffenseCategory::DrugOffense => "Drug Offense",
            OffenseCategory::WeaponOffense => "Weapon Offense",
            OffenseCategory::TrafficViolation => "Traffic Violation",
            OffenseCategory::Other => "Other",
        }
    }
}
