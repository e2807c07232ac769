// 🗺️ Geospatial Sampler - city bounding boxes and stratified point sampling
// Large point sets are thinned per offense category so the map keeps its composition

use crate::records::AlignedRecord;
use crate::vocabulary::Category;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("unknown city identifier: {0} (expected NYC or LA)")]
    UnknownCity(String),

    #[error("sample fraction must be in (0, 1), got {0}")]
    InvalidSampleFraction(f64),
}

// ============================================================================
// CITY BOUNDS
// ============================================================================

/// Inclusive latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityBounds {
    pub lat: (f64, f64),
    pub lon: (f64, f64),
}

impl CityBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat.0 && lat <= self.lat.1 && lon >= self.lon.0 && lon <= self.lon.1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.lat.0 + self.lat.1) / 2.0, (self.lon.0 + self.lon.1) / 2.0)
    }
}

const NYC_BOUNDS: CityBounds = CityBounds {
    lat: (40.4, 40.95),
    lon: (-74.30, -73.65),
};

const LA_BOUNDS: CityBounds = CityBounds {
    lat: (33.65, 34.35),
    lon: (-118.95, -118.12),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Nyc,
    La,
}

impl City {
    pub fn bounds(&self) -> CityBounds {
        match self {
            City::Nyc => NYC_BOUNDS,
            City::La => LA_BOUNDS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            City::Nyc => "NYC",
            City::La => "LA",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            City::Nyc => "New York City",
            City::La => "Los Angeles",
        }
    }
}

impl FromStr for City {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NYC" => Ok(City::Nyc),
            "LA" => Ok(City::La),
            _ => Err(GeoError::UnknownCity(s.to_string())),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// SAMPLING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub fraction: f64,
    pub seed: u64,
    /// At or below this many in-bounds points nothing is sampled
    pub max_unsampled_points: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        SamplingOptions {
            fraction: 0.01,
            seed: 42,
            max_unsampled_points: 10_000,
        }
    }
}

impl SamplingOptions {
    pub fn with_fraction(fraction: f64) -> Self {
        SamplingOptions {
            fraction,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), GeoError> {
        if self.fraction > 0.0 && self.fraction < 1.0 {
            Ok(())
        } else {
            Err(GeoError::InvalidSampleFraction(self.fraction))
        }
    }
}

/// Rows whose coordinates fall inside the box; rows without coordinates are dropped
pub fn filter_to_bounds(records: &[AlignedRecord], bounds: &CityBounds) -> Vec<AlignedRecord> {
    records
        .iter()
        .filter(|r| r.coordinates().is_some_and(|(lat, lon)| bounds.contains(lat, lon)))
        .cloned()
        .collect()
}

/// Per-group sample size: every non-empty group keeps at least one row
pub fn stratum_size(group_size: usize, fraction: f64) -> usize {
    ((group_size as f64 * fraction).floor() as usize).clamp(1, group_size.max(1))
}

fn take_rows(records: &[AlignedRecord], indices: &[usize]) -> Vec<AlignedRecord> {
    indices.iter().filter_map(|&i| records.get(i).cloned()).collect()
}

/// Sample each `Offense_Std` group independently. Rows without a category are
/// not part of any group and are dropped.
pub fn stratified_sample(records: &[AlignedRecord], fraction: f64, seed: u64) -> Vec<AlignedRecord> {
    let mut groups: BTreeMap<&'static str, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        if let Some(category) = record.offense_std {
            groups.entry(category.label()).or_default().push(i);
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = Vec::new();
    for (category, members) in &groups {
        let amount = stratum_size(members.len(), fraction);
        let chosen = rand::seq::index::sample(&mut rng, members.len(), amount);
        let mut rows: Vec<usize> = chosen.into_iter().map(|j| members[j]).collect();
        rows.sort_unstable();
        log::debug!("Stratum {category}: {} of {} rows", rows.len(), members.len());
        picked.extend(rows);
    }
    take_rows(records, &picked)
}

/// Uniform sample of `round(len * fraction)` rows, kept in original order
pub fn uniform_sample(records: &[AlignedRecord], fraction: f64, seed: u64) -> Vec<AlignedRecord> {
    let amount = ((records.len() as f64 * fraction).round() as usize).min(records.len());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = rand::seq::index::sample(&mut rng, records.len(), amount).into_vec();
    rows.sort_unstable();
    take_rows(records, &rows)
}

/// Bounds-filter an aligned set to `city` and thin it when it is large.
/// Stratifies by offense when the set carries any offense category.
pub fn prepare_crime_points(
    records: &[AlignedRecord],
    city: City,
    options: &SamplingOptions,
) -> Result<Vec<AlignedRecord>, GeoError> {
    options.validate()?;

    let in_bounds = filter_to_bounds(records, &city.bounds());
    if in_bounds.len() <= options.max_unsampled_points {
        log::info!("{city}: {} points in bounds, no sampling", in_bounds.len());
        return Ok(in_bounds);
    }

    let sampled = if in_bounds.iter().any(|r| r.offense_std.is_some()) {
        stratified_sample(&in_bounds, options.fraction, options.seed)
    } else {
        uniform_sample(&in_bounds, options.fraction, options.seed)
    };
    log::info!(
        "{city}: sampled {} of {} in-bounds points (fraction {})",
        sampled.len(),
        in_bounds.len(),
        options.fraction
    );
    Ok(sampled)
}

/// (longitude, latitude) columns of a prepared set, for density estimation
pub fn point_coordinates(records: &[AlignedRecord]) -> (Vec<f64>, Vec<f64>) {
    records
        .iter()
        .filter_map(AlignedRecord::coordinates)
        .map(|(lat, lon)| (lon, lat))
        .unzip()
}

/// How many sampled points fall in each offense category
pub fn offense_counts(records: &[AlignedRecord]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for category in records.iter().filter_map(|r| r.offense_std) {
        *counts.entry(category.label()).or_insert(0) += 1;
    }
    counts
}
