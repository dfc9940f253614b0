//! Classification and layout engine for the tactical overlay.
//!
//! Turns analysis payloads into the nine-sector grid via [`build_tactical_overlay`]
//! and per-country scores into globe styling via [`GlobeStyler`]. Every call is
//! a pure function of its inputs and the loaded [`OverlayConfig`].

mod assembler;
mod choropleth_config;
mod classifier;
pub mod config;
mod country;
mod feature_category;
mod feature_style;
mod globe;
mod grid;
mod keyword_config;
mod score;
mod sector_config;

pub use overlay_runtime::*;

pub use assembler::{CategorySet, LegendEntry, SectorAssembler, TacticalOverlay};
pub use choropleth_config::{
    load_choropleth_config_from_env, ChoroplethConfig, ChoroplethConfigError,
    BUILTIN_CHOROPLETH_CONFIG,
};
pub use classifier::{classify_description, keyword_scores};
pub use config::{
    load_overlay_config_from_env, ConfigMetadata, OverlayConfig, OverlayConfigMetadata,
};
pub use country::{
    load_country_table_from_env, CountryCodeTable, CountryResolution, CountryTableError,
    ResolutionMethod, BUILTIN_COUNTRY_TABLE,
};
pub use feature_category::{
    categorize_osm_tags, readable_name, resolve_feature_category, tag_osm_feature,
};
pub use feature_style::{style_feature, StyledFeature};
pub use globe::{canonicalize_score_keys, CountryStyle, GlobeStyler, ScoreLegend};
pub use grid::{build_grid, geometry_centroid, grid_extent, sector_for_point, GridCell};
pub use keyword_config::{
    load_keyword_table_from_env, KeywordEntry, KeywordTable, KeywordTableError,
    BUILTIN_KEYWORD_TABLE,
};
pub use score::{ScoreColorMapper, ScoreDomain, ScoreSide};
pub use sector_config::{
    load_sector_config_from_env, SectorConfig, SectorConfigError, BUILTIN_SECTOR_CONFIG,
    DEFAULT_CELL_SIZE_DEG,
};

/// Assemble the overlay for `input` with the tables in `config`.
pub fn build_tactical_overlay(input: &AnalysisInput, config: &OverlayConfig) -> TacticalOverlay {
    SectorAssembler::new(&config.keywords, &config.sectors).assemble(input)
}
