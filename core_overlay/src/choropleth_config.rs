//! Color and height settings for the score globe.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use overlay_runtime::Rgb;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{load_with_override, ConfigMetadata};

pub const BUILTIN_CHOROPLETH_CONFIG: &str = include_str!("data/choropleth_config.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChoroplethConfig {
    neutral: Rgb,
    deficit_extreme: Rgb,
    surplus_extreme: Rgb,
    no_data: Rgb,
    cap_opacity: f32,
    side_opacity: f32,
    base_altitude: f64,
    altitude_scale: f64,
}

impl ChoroplethConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_CHOROPLETH_CONFIG)
                .expect("builtin choropleth config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ChoroplethConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ChoroplethConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = ChoroplethConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Shared color for scores at zero on either side.
    pub fn neutral(&self) -> Rgb {
        self.neutral
    }

    pub fn deficit_extreme(&self) -> Rgb {
        self.deficit_extreme
    }

    pub fn surplus_extreme(&self) -> Rgb {
        self.surplus_extreme
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    pub fn cap_opacity(&self) -> f32 {
        self.cap_opacity.clamp(0.0, 1.0)
    }

    pub fn side_opacity(&self) -> f32 {
        self.side_opacity.clamp(0.0, 1.0)
    }

    pub fn base_altitude(&self) -> f64 {
        if self.base_altitude.is_finite() {
            self.base_altitude.max(0.0)
        } else {
            0.0
        }
    }

    pub fn altitude_scale(&self) -> f64 {
        if self.altitude_scale.is_finite() {
            self.altitude_scale.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            neutral: Rgb::new(255, 237, 160),
            deficit_extreme: Rgb::new(189, 0, 38),
            surplus_extreme: Rgb::new(0, 104, 55),
            no_data: Rgb::new(60, 64, 72),
            cap_opacity: 0.9,
            side_opacity: 0.35,
            base_altitude: 0.01,
            altitude_scale: 0.25,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChoroplethConfigError {
    #[error("failed to parse choropleth config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read choropleth config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn load_choropleth_config_from_env() -> (Arc<ChoroplethConfig>, ConfigMetadata) {
    load_with_override(
        "choropleth_config",
        "CHOROPLETH_CONFIG_PATH",
        "choropleth_config.json",
        ChoroplethConfig::from_file,
        ChoroplethConfig::builtin,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = ChoroplethConfig::builtin();
        assert_eq!(config.neutral(), ChoroplethConfig::default().neutral());
        assert_eq!(config.side_opacity(), 0.35);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = ChoroplethConfig::from_json_str(
            r#"{"cap_opacity": 3.0, "side_opacity": -1.0, "altitude_scale": -5.0}"#,
        )
        .unwrap();
        assert_eq!(config.cap_opacity(), 1.0);
        assert_eq!(config.side_opacity(), 0.0);
        assert_eq!(config.altitude_scale(), 0.0);
        assert_eq!(config.surplus_extreme(), Rgb::new(0, 104, 55));
    }
}
