// 🔄 Pipeline Orchestration - load → rename → clean → standardize → align → year filter
// Results are memoized per input-path pair so repeated requests skip the work

use crate::align::{align_datasets, align_one};
use crate::cleaning::CleaningReport;
use crate::config::PipelineConfig;
use crate::density::{estimate_density, DensityEstimate};
use crate::geo::{point_coordinates, prepare_crime_points, City, GeoError, SamplingOptions};
use crate::io::{load_records, save_aligned};
use crate::records::{AlignedRecord, Dataset, LapdRecord, NypdRecord};
use crate::source::{Department, DepartmentRecord};
use crate::year_filter::filter_by_overlapping_years;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Rows kept by `create_sample`
pub const DEFAULT_SAMPLE_ROWS: usize = 5000;

/// Both departments on the common schema, restricted to their shared years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonData {
    pub nypd: Vec<AlignedRecord>,
    pub lapd: Vec<AlignedRecord>,
    /// One report per department; empty when the inputs were already aligned
    pub reports: Vec<CleaningReport>,
}

impl ComparisonData {
    pub fn get(&self, department: Department) -> &[AlignedRecord] {
        match department {
            Department::Nypd => &self.nypd,
            Department::Lapd => &self.lapd,
        }
    }

    /// Dataset plotted on a city's map
    pub fn for_city(&self, city: City) -> &[AlignedRecord] {
        match city {
            City::Nyc => &self.nypd,
            City::La => &self.lapd,
        }
    }
}

/// Run the full pipeline over two raw (or pre-aligned) inputs.
///
/// Either input being absent means "no data available" for the whole comparison.
/// When both inputs are already aligned only the year filter runs; a single
/// pre-aligned side is passed through while the other is processed.
pub fn run_pipeline(
    nypd: Option<Dataset<NypdRecord>>,
    lapd: Option<Dataset<LapdRecord>>,
) -> Option<ComparisonData> {
    let (Some(nypd), Some(lapd)) = (nypd, lapd) else {
        log::error!("Pipeline aborted: a department dataset failed to load");
        return None;
    };

    let (nypd, lapd, reports) = match (nypd, lapd) {
        (Dataset::Aligned(nypd), Dataset::Aligned(lapd)) => {
            log::info!("Inputs already aligned; applying year filter only");
            (nypd, lapd, Vec::new())
        }
        (Dataset::Raw(nypd), Dataset::Raw(lapd)) => {
            let (nypd_std, nypd_report) = NypdRecord::process(&nypd);
            let (lapd_std, lapd_report) = LapdRecord::process(&lapd);
            let aligned = align_datasets(Some(&nypd_std[..]), Some(&lapd_std[..]))?;
            (aligned.nypd, aligned.lapd, vec![nypd_report, lapd_report])
        }
        (nypd, lapd) => {
            let mut reports = Vec::new();
            let nypd = into_aligned(nypd, &mut reports);
            let lapd = into_aligned(lapd, &mut reports);
            (nypd, lapd, reports)
        }
    };

    let (nypd, lapd) = filter_by_overlapping_years(&nypd, &lapd);
    log::info!(
        "Pipeline complete: NYPD {} rows, LAPD {} rows",
        nypd.len(),
        lapd.len()
    );

    Some(ComparisonData { nypd, lapd, reports })
}

fn into_aligned<R: DepartmentRecord>(dataset: Dataset<R>, reports: &mut Vec<CleaningReport>) -> Vec<AlignedRecord> {
    match dataset {
        Dataset::Aligned(records) => records,
        Dataset::Raw(records) => {
            let (standardized, report) = R::process(&records);
            reports.push(report);
            align_one(&standardized[..])
        }
    }
}

/// Load both files and run the pipeline
pub fn process_files(nypd_path: &Path, lapd_path: &Path) -> Option<ComparisonData> {
    run_pipeline(load_records(nypd_path), load_records(lapd_path))
}

/// Resolve the configured inputs (with sample fallback), load and process them
pub fn load_and_process(config: &PipelineConfig) -> Option<ComparisonData> {
    let (nypd_path, lapd_path) = config.resolve_paths();
    process_files(&nypd_path, &lapd_path)
}

/// Write both aligned sets as `nypd_aligned.csv` / `lapd_aligned.csv` under `out_dir`
pub fn export_aligned(data: &ComparisonData, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let nypd_path = out_dir.join("nypd_aligned.csv");
    let lapd_path = out_dir.join("lapd_aligned.csv");
    save_aligned(&data.nypd, &nypd_path)?;
    save_aligned(&data.lapd, &lapd_path)?;
    log::info!("Exported aligned data to {}", out_dir.display());
    Ok((nypd_path, lapd_path))
}

/// Copy the header and first `rows` records of `input` to `output`, for quick
/// demo runs. Cells are copied as text so values like `007` survive.
pub fn create_sample(input: &Path, output: &Path, rows: usize) -> Result<usize> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(input)
        .with_context(|| format!("Failed to open file: {}", input.display()))?;
    let mut writer = WriterBuilder::new()
        .from_path(output)
        .with_context(|| format!("Failed to create file: {}", output.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", input.display()))?
        .clone();
    writer.write_record(&headers).context("Failed to write CSV header")?;

    let mut written = 0;
    for (line_num, result) in reader.records().take(rows).enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, input.display())
        })?;
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write row to {}", output.display()))?;
        written += 1;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    log::info!("Created {} with {} rows", output.display(), written);
    Ok(written)
}

// ============================================================================
// MEMOIZATION
// ============================================================================

type CacheKey = (PathBuf, PathBuf);

/// Memoized pipeline results keyed by the (NYPD, LAPD) input paths.
/// Failed loads are not cached, so a file that appears later is picked up.
#[derive(Default)]
pub struct PipelineCache {
    entries: Mutex<HashMap<CacheKey, Arc<ComparisonData>>>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pipeline runs without the lock held, so requests for other inputs are
    /// not blocked. Concurrent misses on one key may both compute; the first
    /// insert wins and every caller gets that entry.
    pub fn get_or_process(&self, nypd_path: &Path, lapd_path: &Path) -> Option<Arc<ComparisonData>> {
        let key = (nypd_path.to_path_buf(), lapd_path.to_path_buf());

        {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = entries.get(&key) {
                log::debug!("Pipeline cache hit for {:?}", key);
                return Some(Arc::clone(hit));
            }
        }

        let data = Arc::new(process_files(nypd_path, lapd_path)?);

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Some(Arc::clone(entries.entry(key).or_insert(data)))
    }

    pub fn get_or_load(&self, config: &PipelineConfig) -> Option<Arc<ComparisonData>> {
        let (nypd_path, lapd_path) = config.resolve_paths();
        self.get_or_process(&nypd_path, &lapd_path)
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

// ============================================================================
// GEO VIEW
// ============================================================================

/// Points for one city map plus their normalized density, when there are enough
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoView {
    pub city: City,
    pub points: Vec<AlignedRecord>,
    pub density: Option<DensityEstimate>,
    pub plotted: usize,
}

pub fn geo_view(
    data: &ComparisonData,
    city: City,
    options: &SamplingOptions,
    min_density_points: usize,
) -> Result<GeoView, GeoError> {
    let points = prepare_crime_points(data.for_city(city), city, options)?;
    let (xs, ys) = point_coordinates(&points);

    let density = if xs.len() >= min_density_points {
        estimate_density(&xs, &ys)
    } else {
        None
    };
    if density.is_none() {
        log::info!("{city}: {} points, rendering without density", xs.len());
    }

    Ok(GeoView {
        city,
        plotted: points.len(),
        points,
        density,
    })
}
