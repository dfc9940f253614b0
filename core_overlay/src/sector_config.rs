use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use overlay_runtime::NO_INTEL;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{load_with_override, ConfigMetadata};

pub const BUILTIN_SECTOR_CONFIG: &str = include_str!("data/sector_config.json");

/// Cell size used when the configured one is unusable.
pub const DEFAULT_CELL_SIZE_DEG: f64 = 0.001;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SectorConfig {
    cell_size_deg: f64,
    no_intel_description: String,
    line_stroke_width: f32,
    line_opacity: f32,
    area_stroke_width: f32,
    area_fill_opacity: f32,
}

impl SectorConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_SECTOR_CONFIG)
                .expect("builtin sector config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, SectorConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| SectorConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = SectorConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn with_cell_size(mut self, cell_size_deg: f64) -> Self {
        self.cell_size_deg = cell_size_deg;
        self
    }

    /// Angular size of one grid cell in degrees; never zero or negative.
    pub fn cell_size_deg(&self) -> f64 {
        if self.cell_size_deg.is_finite() && self.cell_size_deg > 0.0 {
            self.cell_size_deg
        } else {
            DEFAULT_CELL_SIZE_DEG
        }
    }

    pub fn no_intel_description(&self) -> &str {
        if self.no_intel_description.trim().is_empty() {
            NO_INTEL
        } else {
            &self.no_intel_description
        }
    }

    pub fn line_stroke_width(&self) -> f32 {
        self.line_stroke_width.max(0.0)
    }

    pub fn line_opacity(&self) -> f32 {
        self.line_opacity.clamp(0.0, 1.0)
    }

    pub fn area_stroke_width(&self) -> f32 {
        self.area_stroke_width.max(0.0)
    }

    pub fn area_fill_opacity(&self) -> f32 {
        self.area_fill_opacity.clamp(0.0, 1.0)
    }
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            cell_size_deg: DEFAULT_CELL_SIZE_DEG,
            no_intel_description: NO_INTEL.to_string(),
            line_stroke_width: 4.0,
            line_opacity: 0.9,
            area_stroke_width: 1.5,
            area_fill_opacity: 0.35,
        }
    }
}

#[derive(Debug, Error)]
pub enum SectorConfigError {
    #[error("failed to parse sector config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read sector config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn load_sector_config_from_env() -> (Arc<SectorConfig>, ConfigMetadata) {
    load_with_override(
        "sector_config",
        "SECTOR_CONFIG_PATH",
        "sector_config.json",
        SectorConfig::from_file,
        SectorConfig::builtin,
    )
}
