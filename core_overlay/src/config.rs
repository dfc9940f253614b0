//! Bundled configuration for the overlay engine.
//!
//! Every table ships as JSON compiled into the crate and can be swapped for a
//! file on disk through an environment variable.

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::choropleth_config::{load_choropleth_config_from_env, ChoroplethConfig};
use crate::country::{load_country_table_from_env, CountryCodeTable};
use crate::keyword_config::{load_keyword_table_from_env, KeywordTable};
use crate::sector_config::{load_sector_config_from_env, SectorConfig};

/// Where a loaded table came from. `None` means the builtin copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    path: Option<PathBuf>,
}

impl ConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.path.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub keywords: Arc<KeywordTable>,
    pub sectors: Arc<SectorConfig>,
    pub choropleth: Arc<ChoroplethConfig>,
    pub countries: Arc<CountryCodeTable>,
}

impl OverlayConfig {
    pub fn builtin() -> Self {
        Self {
            keywords: KeywordTable::builtin(),
            sectors: SectorConfig::builtin(),
            choropleth: ChoroplethConfig::builtin(),
            countries: CountryCodeTable::builtin(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayConfigMetadata {
    pub keywords: ConfigMetadata,
    pub sectors: ConfigMetadata,
    pub choropleth: ConfigMetadata,
    pub countries: ConfigMetadata,
}

/// Load every table, honoring the per-table path overrides.
pub fn load_overlay_config_from_env() -> (OverlayConfig, OverlayConfigMetadata) {
    let (keywords, keywords_meta) = load_keyword_table_from_env();
    let (sectors, sectors_meta) = load_sector_config_from_env();
    let (choropleth, choropleth_meta) = load_choropleth_config_from_env();
    let (countries, countries_meta) = load_country_table_from_env();
    (
        OverlayConfig {
            keywords,
            sectors,
            choropleth,
            countries,
        },
        OverlayConfigMetadata {
            keywords: keywords_meta,
            sectors: sectors_meta,
            choropleth: choropleth_meta,
            countries: countries_meta,
        },
    )
}

pub(crate) fn default_data_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src/data")
        .join(file_name)
}

/// Try the override path from `env_var` (or the in-tree data file), then fall
/// back to the builtin copy.
pub(crate) fn load_with_override<T, E, F>(
    label: &'static str,
    env_var: &str,
    file_name: &str,
    from_file: F,
    builtin: fn() -> Arc<T>,
) -> (Arc<T>, ConfigMetadata)
where
    E: Display,
    F: Fn(&Path) -> Result<T, E>,
{
    let path = env::var(env_var)
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_data_path(file_name));

    match from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "tactical::config",
                config = label,
                path = %path.display(),
                "config.loaded=file"
            );
            return (Arc::new(config), ConfigMetadata::new(Some(path)));
        }
        Err(err) => {
            tracing::warn!(
                target: "tactical::config",
                config = label,
                path = %path.display(),
                error = %err,
                "config.load_failed"
            );
        }
    }

    tracing::info!(target: "tactical::config", config = label, "config.loaded=builtin");
    (builtin(), ConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bundle_parses() {
        let config = OverlayConfig::builtin();
        assert!(!config.keywords.entries().is_empty());
        assert!(config.sectors.cell_size_deg() > 0.0);
        assert!(config.countries.numeric_len() > 150);
    }

    #[test]
    fn missing_override_falls_back_to_builtin() {
        let (table, meta) = load_with_override(
            "keyword_table",
            "TACTICAL_TEST_UNSET_PATH_VAR",
            "does_not_exist.json",
            KeywordTable::from_file,
            KeywordTable::builtin,
        );
        assert!(meta.is_builtin());
        assert_eq!(table.entries().len(), KeywordTable::builtin().entries().len());
    }
}
