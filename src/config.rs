//! Runtime configuration: input paths, output directory and display defaults.
//!
//! Values come from a JSON file (`prenoms.json`, or the path in
//! `PRENOMS_CONFIG`). Every field has a default, so a missing file or a
//! partial file is fine.
use crate::error::{DataError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "PRENOMS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "prenoms.json";
pub const RARE_NAMES_SENTINEL: &str = "_PRENOMS_RARES";

/// Which year × department grid panels are completed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainSource {
    /// Years and departments present in the loaded table.
    Observed,
    /// The fixed 1900–2022 range and the 100 department codes.
    Standard,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub raw_data_path: PathBuf,
    pub clean_data_path: PathBuf,
    pub reference_path: PathBuf,
    pub region_boundaries_path: PathBuf,
    pub department_boundaries_path: PathBuf,
    pub output_dir: PathBuf,
    pub default_name: String,
    pub top_n: usize,
    pub rare_names_sentinel: String,
    pub cache_capacity: usize,
    pub panel_domain: DomainSource,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            raw_data_path: PathBuf::from("data/dpt2022_csv/dpt2022.csv"),
            clean_data_path: PathBuf::from("data/output/prenom_clean.csv"),
            reference_path: PathBuf::from("data/geojson/output/region_departement.csv"),
            region_boundaries_path: PathBuf::from(
                "data/geojson/input/ref-regions-domcom-rapproches.geojson",
            ),
            department_boundaries_path: PathBuf::from(
                "data/geojson/input/ref-departements-domcom-rapproches.geojson",
            ),
            output_dir: PathBuf::from("output"),
            default_name: "CHANTAL".to_string(),
            top_n: 20,
            rare_names_sentinel: RARE_NAMES_SENTINEL.to_string(),
            cache_capacity: 32,
            panel_domain: DomainSource::Observed,
        }
    }
}

impl Config {
    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DataError::io(path.display().to_string(), e))?;
        let cfg: Config = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    /// Load from `$PRENOMS_CONFIG`, else `prenoms.json` in the working
    /// directory, else defaults.
    pub fn load() -> Result<Config> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            info!("loading configuration from {}", path.display());
            Config::from_file(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Boundary file for a map granularity.
    pub fn boundaries_path(&self, mode: crate::map_config::GeoMode) -> &Path {
        match mode {
            crate::map_config::GeoMode::Region => &self.region_boundaries_path,
            crate::map_config::GeoMode::Department => &self.department_boundaries_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_name": "ALICE", "panel_domain": "standard"}}"#).unwrap();
        let cfg = Config::from_file(file.path()).unwrap();
        assert_eq!(cfg.default_name, "ALICE");
        assert_eq!(cfg.panel_domain, DomainSource::Standard);
        assert_eq!(cfg.top_n, 20);
        assert_eq!(cfg.rare_names_sentinel, RARE_NAMES_SENTINEL);
    }

    #[test]
    fn rejects_unknown_domain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"panel_domain": "everything"}}"#).unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }
}
