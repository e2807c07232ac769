// ⚙️ Pipeline Configuration - input locations and sampling knobs
// JSON file, every field optional; missing fields take the defaults below

use crate::density::MIN_DENSITY_POINTS;
use crate::geo::SamplingOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    /// Preferred (usually pre-aligned) inputs
    pub nypd_file: String,
    pub lapd_file: String,
    /// Used when the preferred file does not exist
    pub nypd_sample_file: String,
    pub lapd_sample_file: String,
    pub sample_fraction: f64,
    pub sample_seed: u64,
    pub max_unsampled_points: usize,
    pub min_density_points: usize,
    pub server_addr: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("data"),
            nypd_file: "nypd_aligned.csv".to_string(),
            lapd_file: "lapd_aligned.csv".to_string(),
            nypd_sample_file: "sample_nypd.csv".to_string(),
            lapd_sample_file: "sample_lapd.csv".to_string(),
            sample_fraction: 0.01,
            sample_seed: 42,
            max_unsampled_points: 10_000,
            min_density_points: MIN_DENSITY_POINTS,
            server_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// (NYPD, LAPD) input paths. Each side independently prefers its main file
    /// and falls back to the sample file when the main one is absent.
    pub fn resolve_paths(&self) -> (PathBuf, PathBuf) {
        let pick = |preferred: &str, fallback: &str| {
            let path = self.data_dir.join(preferred);
            if path.exists() {
                path
            } else {
                log::info!("{} not found, using {}", path.display(), fallback);
                self.data_dir.join(fallback)
            }
        };
        (
            pick(&self.nypd_file, &self.nypd_sample_file),
            pick(&self.lapd_file, &self.lapd_sample_file),
        )
    }

    /// Sampling options with an overridden fraction (e.g. from a request)
    pub fn sampling(&self, fraction: Option<f64>) -> SamplingOptions {
        SamplingOptions {
            fraction: fraction.unwrap_or(self.sample_fraction),
            seed: self.sample_seed,
            max_unsampled_points: self.max_unsampled_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arrest_compare_config_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = scratch_dir("partial");
        let path = dir.join("config.json");
        fs::write(&path, r#"{ "sample_fraction": 0.05, "data_dir": "/srv/arrests" }"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();

        assert_eq!(config.sample_fraction, 0.05);
        assert_eq!(config.data_dir, PathBuf::from("/srv/arrests"));
        assert_eq!(config.sample_seed, 42);
        assert_eq!(config.min_density_points, 11);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = scratch_dir("bad");
        let path = dir.join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(PipelineConfig::from_file(&dir.join("absent.json")).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_paths_falls_back_per_department() {
        let dir = scratch_dir("resolve");
        fs::write(dir.join("nypd_aligned.csv"), "Data_Source\nNYPD\n").unwrap();

        let config = PipelineConfig {
            data_dir: dir.clone(),
            ..Default::default()
        };
        let (nypd, lapd) = config.resolve_paths();

        assert_eq!(nypd, dir.join("nypd_aligned.csv"));
        assert_eq!(lapd, dir.join("sample_lapd.csv"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sampling_override() {
        let config = PipelineConfig::default();
        assert_eq!(config.sampling(None).fraction, 0.01);
        assert_eq!(config.sampling(Some(0.2)).fraction, 0.2);
        assert_eq!(config.sampling(None).max_unsampled_points, 10_000);
    }
}
