use overlay_runtime::{Category, DirectionalTag, Feature, LatLng, Rgba};
use serde::Serialize;

use crate::feature_category::resolve_feature_category;
use crate::grid::{geometry_centroid, sector_for_point};
use crate::sector_config::SectorConfig;

/// Render-ready styling for one upstream feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledFeature {
    pub name: String,
    pub category: Category,
    pub feature_type: String,
    /// Declared sector, else the cell holding the geometry centroid.
    pub sector: Option<DirectionalTag>,
    pub line_like: bool,
    pub stroke: Rgba,
    pub fill: Option<Rgba>,
    pub stroke_width: f32,
}

pub fn style_feature(feature: &Feature, focal: LatLng, config: &SectorConfig) -> StyledFeature {
    let properties = feature.props();
    let category = properties
        .map(resolve_feature_category)
        .unwrap_or_default();
    let feature_type = properties
        .and_then(|p| p.feature_type.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let line_like = feature_type == "highway"
        || feature
            .geometry
            .as_ref()
            .map(|geometry| geometry.is_line_like())
            .unwrap_or(false);
    let sector = properties.and_then(|p| p.declared_sector()).or_else(|| {
        feature
            .geometry
            .as_ref()
            .and_then(geometry_centroid)
            .map(|centroid| sector_for_point(centroid, focal, config.cell_size_deg()))
    });
    let name = properties
        .and_then(|p| p.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| category.label().to_string());

    let color = category.color();
    let (stroke, fill, stroke_width) = if line_like {
        (
            color.with_alpha(config.line_opacity()),
            None,
            config.line_stroke_width(),
        )
    } else {
        (
            color.with_alpha(1.0),
            Some(color.with_alpha(config.area_fill_opacity())),
            config.area_stroke_width(),
        )
    };

    StyledFeature {
        name,
        category,
        feature_type,
        sector,
        line_like,
        stroke,
        fill,
        stroke_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(json: &str) -> Feature {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn highways_are_stroked_without_fill() {
        let config = SectorConfig::default();
        let styled = style_feature(
            &feature(
                r#"{"geometry":{"type":"Polygon","coordinates":[]},
                    "properties":{"category":"access","feature_type":"highway","sector":"S"}}"#,
            ),
            LatLng::default(),
            &config,
        );
        assert!(styled.line_like);
        assert!(styled.fill.is_none());
        assert_eq!(styled.stroke_width, config.line_stroke_width());
        assert_eq!(styled.stroke.rgb(), Category::Access.color());
        assert_eq!(styled.sector, Some(DirectionalTag::S));
        assert_eq!(styled.name, "Access");
    }

    #[test]
    fn polygons_get_translucent_fill() {
        let config = SectorConfig::default();
        let styled = style_feature(
            &feature(
                r#"{"geometry":{"type":"Polygon","coordinates":[[[0.0,0.0],[0.0,0.0005],[0.0005,0.0],[0.0,0.0]]]},
                    "properties":{"category":"staging","feature_type":"leisure","name":"Park"}}"#,
            ),
            LatLng::default(),
            &config,
        );
        assert!(!styled.line_like);
        let fill = styled.fill.unwrap();
        assert_eq!(fill.a, config.area_fill_opacity());
        assert_eq!(styled.sector, Some(DirectionalTag::C));
        assert_eq!(styled.name, "Park");
    }

    #[test]
    fn features_without_properties_are_unknown() {
        let styled = style_feature(&feature("{}"), LatLng::default(), &SectorConfig::default());
        assert_eq!(styled.category, Category::Unknown);
        assert_eq!(styled.feature_type, "unknown");
        assert_eq!(styled.sector, None);
    }
}
