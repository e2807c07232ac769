// Arrest Data Comparison - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod records;     // Typed department + aligned rows
pub mod io;          // CSV load/save
pub mod vocabulary;  // Shared category labels
pub mod schema;      // Column names + per-department rename maps
pub mod rules;       // Offense keyword rules
pub mod cleaning;    // Default-fill, date parts, dedup
pub mod standardize; // Department codes → shared vocabularies
pub mod source;      // Department tag + per-department pipeline
pub mod align;       // Common schema projection
pub mod year_filter; // Overlapping-year restriction
pub mod geo;         // City bounds + stratified sampling
pub mod density;     // 2-D Gaussian KDE
pub mod analysis;    // Temporal + demographic views
pub mod config;      // PipelineConfig
pub mod pipeline;    // Orchestration + memoization

// Re-export commonly used types
pub use records::{AlignedRecord, Dataset, LapdRecord, NypdRecord};
pub use io::{load_dataset, load_records, read_dataset, save_aligned};
pub use vocabulary::{AgeCategory, Category, Gender, OffenseCategory, Race};
pub use schema::{col, normalize_headers};
pub use rules::{OffenseClassifier, OffenseRule};
pub use cleaning::{clean_lapd, clean_nypd, CleaningReport, DateParseError};
pub use standardize::convert_numeric_age_to_category;
pub use source::{detect_department, order_by_department, Department, DepartmentRecord};
pub use align::{align_datasets, AlignedPair, COMMON_COLUMNS};
pub use year_filter::{available_year_range, filter_by_overlapping_years, filter_year_range};
pub use geo::{prepare_crime_points, City, CityBounds, GeoError, SamplingOptions};
pub use density::{estimate_density, DensityEstimate};
pub use analysis::{demographic_summary, temporal_summary, DemographicSummary, TemporalSummary};
pub use config::PipelineConfig;
pub use pipeline::{
    create_sample, export_aligned, geo_view, load_and_process, process_files, run_pipeline,
    ComparisonData, GeoView, PipelineCache,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
