//! Turns an analysis payload into the nine render-ready sectors.
//!
//! Each tag is resolved in two tiers: features that declare the tag are
//! authoritative, and only when none does is the text heuristic consulted.

use std::collections::BTreeMap;

use bitflags::bitflags;
use overlay_runtime::{
    normalize_description, parse_sector_text, AnalysisInput, Bounds, Category, DirectionalTag,
    FeatureProperties, LatLng, Rgb, SectorRecord, SectorSource, SectorTextMap,
};
use serde::{Deserialize, Serialize};

use crate::classifier::classify_description;
use crate::feature_category::resolve_feature_category;
use crate::feature_style::{style_feature, StyledFeature};
use crate::grid::{build_grid, grid_extent};
use crate::keyword_config::KeywordTable;
use crate::sector_config::SectorConfig;

bitflags! {
    /// Non-unknown categories present in one overlay.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CategorySet: u8 {
        const STAGING = 1 << 0;
        const RISK = 1 << 1;
        const ACCESS = 1 << 2;
        const OPERATIONS = 1 << 3;
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        CategorySet::empty()
    }
}

impl CategorySet {
    pub fn from_category(category: Category) -> Self {
        match category {
            Category::Staging => CategorySet::STAGING,
            Category::Risk => CategorySet::RISK,
            Category::Access => CategorySet::ACCESS,
            Category::Operations => CategorySet::OPERATIONS,
            Category::Unknown => CategorySet::empty(),
        }
    }

    pub fn contains_category(self, category: Category) -> bool {
        let flag = Self::from_category(category);
        !flag.is_empty() && self.contains(flag)
    }

    /// Members in canonical category order.
    pub fn categories(self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.contains_category(*category))
            .collect()
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CategorySet::empty(), |set, category| {
                set | CategorySet::from_category(category)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub category: Category,
    pub label: &'static str,
    pub color: Rgb,
}

/// Everything the map layer needs for one focal point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TacticalOverlay {
    pub focal: LatLng,
    pub name: String,
    pub extent: Bounds,
    /// One record per tag, in [`DirectionalTag::ALL`] order.
    pub sectors: Vec<SectorRecord>,
    pub features: Vec<StyledFeature>,
    pub active_categories: CategorySet,
}

impl TacticalOverlay {
    pub fn sector(&self, tag: DirectionalTag) -> &SectorRecord {
        &self.sectors[tag.index()]
    }

    /// The sectors as three rows, north first.
    pub fn rows(&self) -> impl Iterator<Item = &[SectorRecord]> {
        self.sectors.chunks(3)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.active_categories
            .categories()
            .into_iter()
            .map(|category| LegendEntry {
                category,
                label: category.label(),
                color: category.color(),
            })
            .collect()
    }
}

/// Description and category chosen for one tag.
#[derive(Debug, Clone, PartialEq)]
struct SectorIntel {
    description: String,
    category: Category,
    source: SectorSource,
}

trait IntelSource {
    fn intel_for(&self, tag: DirectionalTag) -> Option<SectorIntel>;
}

/// Heuristic tier: free-text descriptions classified by keyword.
struct TextIntel<'a> {
    sectors_map: SectorTextMap,
    parsed: SectorTextMap,
    keywords: &'a KeywordTable,
}

impl<'a> TextIntel<'a> {
    fn new(input: &AnalysisInput, keywords: &'a KeywordTable) -> Self {
        let mut sectors_map = SectorTextMap::new();
        for (raw_tag, raw_description) in &input.sectors {
            let Ok(tag) = raw_tag.parse::<DirectionalTag>() else {
                tracing::debug!(
                    target: "tactical::sectors",
                    tag = %raw_tag,
                    "sectors_map.unknown_tag"
                );
                continue;
            };
            let description = normalize_description(raw_description);
            if !description.is_empty() {
                sectors_map.entry(tag).or_insert(description);
            }
        }
        Self {
            sectors_map,
            parsed: parse_sector_text(&input.analysis),
            keywords,
        }
    }

    fn description(&self, tag: DirectionalTag) -> Option<(&str, SectorSource)> {
        if let Some(description) = self.sectors_map.get(&tag) {
            return Some((description.as_str(), SectorSource::SectorsMap));
        }
        self.parsed
            .get(&tag)
            .map(|description| (description.as_str(), SectorSource::AnalysisText))
    }
}

impl IntelSource for TextIntel<'_> {
    fn intel_for(&self, tag: DirectionalTag) -> Option<SectorIntel> {
        let (description, source) = self.description(tag)?;
        Some(SectorIntel {
            description: description.to_string(),
            category: classify_description(description, self.keywords),
            source,
        })
    }
}

/// Authoritative tier: the first feature declaring each tag.
struct FeatureIntel<'a> {
    declared: BTreeMap<DirectionalTag, &'a FeatureProperties>,
    text: &'a TextIntel<'a>,
    no_intel: &'a str,
}

impl<'a> FeatureIntel<'a> {
    fn new(input: &'a AnalysisInput, text: &'a TextIntel<'a>, no_intel: &'a str) -> Self {
        let mut declared = BTreeMap::new();
        for properties in input.features().iter().filter_map(|f| f.props()) {
            if let Some(tag) = properties.declared_sector() {
                declared.entry(tag).or_insert(properties);
            }
        }
        Self {
            declared,
            text,
            no_intel,
        }
    }
}

impl IntelSource for FeatureIntel<'_> {
    fn intel_for(&self, tag: DirectionalTag) -> Option<SectorIntel> {
        let properties = self.declared.get(&tag)?;
        let description = properties
            .sector_description
            .as_deref()
            .map(normalize_description)
            .filter(|d| !d.is_empty())
            .or_else(|| self.text.description(tag).map(|(d, _)| d.to_string()))
            .or_else(|| {
                properties
                    .name
                    .as_deref()
                    .map(normalize_description)
                    .filter(|d| !d.is_empty())
            })
            .unwrap_or_else(|| self.no_intel.to_string());
        Some(SectorIntel {
            description,
            category: resolve_feature_category(properties),
            source: SectorSource::Feature,
        })
    }
}

pub struct SectorAssembler<'a> {
    keywords: &'a KeywordTable,
    config: &'a SectorConfig,
}

impl<'a> SectorAssembler<'a> {
    pub fn new(keywords: &'a KeywordTable, config: &'a SectorConfig) -> Self {
        Self { keywords, config }
    }

    /// Always yields nine sectors, however sparse the input.
    pub fn assemble(&self, input: &AnalysisInput) -> TacticalOverlay {
        let focal = input.focal();
        let cell_size = self.config.cell_size_deg();
        let no_intel = self.config.no_intel_description();

        let text = TextIntel::new(input, self.keywords);
        let features = FeatureIntel::new(input, &text, no_intel);
        let tiers: [&dyn IntelSource; 2] = [&features, &text];

        let sectors: Vec<SectorRecord> = build_grid(focal, cell_size)
            .into_iter()
            .map(|cell| {
                let intel = tiers
                    .iter()
                    .find_map(|tier| tier.intel_for(cell.tag))
                    .unwrap_or_else(|| SectorIntel {
                        description: no_intel.to_string(),
                        category: Category::Unknown,
                        source: SectorSource::NoIntel,
                    });
                tracing::trace!(
                    target: "tactical::sectors",
                    tag = %cell.tag,
                    category = %intel.category,
                    source = ?intel.source,
                    "sector.resolved"
                );
                SectorRecord {
                    tag: cell.tag,
                    color: intel.category.color(),
                    description: intel.description,
                    category: intel.category,
                    bounds: cell.bounds,
                    source: intel.source,
                }
            })
            .collect();

        let styled: Vec<StyledFeature> = input
            .features()
            .iter()
            .map(|feature| style_feature(feature, focal, self.config))
            .collect();

        let active_categories = sectors
            .iter()
            .map(|sector| sector.category)
            .chain(styled.iter().map(|feature| feature.category))
            .collect();

        tracing::debug!(
            target: "tactical::sectors",
            name = %input.name,
            features = styled.len(),
            from_features = sectors.iter().filter(|s| s.source == SectorSource::Feature).count(),
            no_intel = sectors.iter().filter(|s| s.source == SectorSource::NoIntel).count(),
            "sectors.assembled"
        );

        TacticalOverlay {
            focal,
            name: input.name.clone(),
            extent: grid_extent(focal, cell_size),
            sectors,
            features: styled,
            active_categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(input: &AnalysisInput) -> TacticalOverlay {
        let keywords = KeywordTable::builtin();
        let config = SectorConfig::default();
        SectorAssembler::new(&keywords, &config).assemble(input)
    }

    fn input(json: &str) -> AnalysisInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_input_still_yields_nine_unknown_sectors() {
        let overlay = assemble(&AnalysisInput::default());
        assert_eq!(overlay.sectors.len(), 9);
        for (sector, tag) in overlay.sectors.iter().zip(DirectionalTag::ALL) {
            assert_eq!(sector.tag, tag);
            assert_eq!(sector.category, Category::Unknown);
            assert_eq!(sector.description, "No intel");
            assert_eq!(sector.source, SectorSource::NoIntel);
            assert_eq!(sector.color, Category::Unknown.color());
        }
        assert!(overlay.active_categories.is_empty());
        assert!(overlay.legend().is_empty());
    }

    #[test]
    fn sectors_map_beats_analysis_text() {
        let overlay = assemble(&input(
            r#"{"analysis":"[W] open field","sectors":{"w":"  main  road ","XX":"ignored"}}"#,
        ));
        let west = overlay.sector(DirectionalTag::W);
        assert_eq!(west.description, "main road");
        assert_eq!(west.category, Category::Access);
        assert_eq!(west.source, SectorSource::SectorsMap);
    }

    #[test]
    fn feature_description_precedence() {
        let overlay = assemble(&input(
            r#"{
                "analysis": "[N] rubble everywhere [S] wide road [E] school",
                "geojson": {"features": [
                    {"properties": {"category": "staging", "sector": "N", "sector_description": "Cleared lot"}},
                    {"properties": {"category": "access", "sector": "S"}},
                    {"properties": {"category": "operations", "sector": "W", "name": "Clinic"}},
                    {"properties": {"category": "risk", "sector": "SE"}},
                    {"properties": {"category": "risk", "sector": "N", "sector_description": "later"}}
                ]}
            }"#,
        ));
        let n = overlay.sector(DirectionalTag::N);
        assert_eq!((n.description.as_str(), n.category), ("Cleared lot", Category::Staging));
        let s = overlay.sector(DirectionalTag::S);
        assert_eq!((s.description.as_str(), s.category), ("wide road", Category::Access));
        let w = overlay.sector(DirectionalTag::W);
        assert_eq!((w.description.as_str(), w.category), ("Clinic", Category::Operations));
        let se = overlay.sector(DirectionalTag::SE);
        assert_eq!((se.description.as_str(), se.category), ("No intel", Category::Risk));
        assert_eq!(se.source, SectorSource::Feature);
        let e = overlay.sector(DirectionalTag::E);
        assert_eq!((e.category, e.source), (Category::Operations, SectorSource::AnalysisText));
    }

    #[test]
    fn feature_category_is_not_reclassified() {
        let overlay = assemble(&input(
            r#"{
                "analysis": "[C] rubble debris collapse",
                "geojson": {"features": [{"properties": {"category": "bogus", "sector": "c"}}]}
            }"#,
        ));
        let center = overlay.sector(DirectionalTag::C);
        assert_eq!(center.category, Category::Unknown);
        assert_eq!(center.description, "rubble debris collapse");
        assert_eq!(center.source, SectorSource::Feature);
    }

    #[test]
    fn active_categories_cover_sectors_and_features() {
        let overlay = assemble(&input(
            r#"{
                "analysis": "[NW] open field",
                "geojson": {"features": [{"properties": {"category": "operations"}}]}
            }"#,
        ));
        assert_eq!(
            overlay.active_categories,
            CategorySet::STAGING | CategorySet::OPERATIONS
        );
        let legend: Vec<Category> = overlay.legend().iter().map(|e| e.category).collect();
        assert_eq!(legend, vec![Category::Staging, Category::Operations]);
    }

    #[test]
    fn active_categories_do_not_leak_between_calls() {
        let keywords = KeywordTable::builtin();
        let config = SectorConfig::default();
        let assembler = SectorAssembler::new(&keywords, &config);
        let first = assembler.assemble(&input(r#"{"analysis":"[N] rubble"}"#));
        let second = assembler.assemble(&input(r#"{"analysis":"[N] gate"}"#));
        assert_eq!(first.active_categories, CategorySet::RISK);
        assert_eq!(second.active_categories, CategorySet::ACCESS);
    }

    #[test]
    fn rows_are_north_first() {
        let overlay = assemble(&AnalysisInput::default());
        let rows: Vec<Vec<DirectionalTag>> = overlay
            .rows()
            .map(|row| row.iter().map(|s| s.tag).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec![DirectionalTag::NW, DirectionalTag::N, DirectionalTag::NE],
                vec![DirectionalTag::W, DirectionalTag::C, DirectionalTag::E],
                vec![DirectionalTag::SW, DirectionalTag::S, DirectionalTag::SE],
            ]
        );
    }

    #[test]
    fn category_set_ignores_unknown() {
        let set: CategorySet = [Category::Unknown, Category::Risk, Category::Risk]
            .into_iter()
            .collect();
        assert_eq!(set, CategorySet::RISK);
        assert!(!set.contains_category(Category::Unknown));
        assert_eq!(set.categories(), vec![Category::Risk]);
    }
}
