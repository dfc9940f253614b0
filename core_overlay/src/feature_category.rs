//! Categories taken from structured feature metadata.
//!
//! [`resolve_feature_category`] is the authoritative path used during sector
//! assembly. [`categorize_osm_tags`] and [`tag_osm_feature`] prepare raw
//! OpenStreetMap features so they carry that metadata in the first place.

use overlay_runtime::{Category, Feature, FeatureProperties, LatLng};

use crate::grid::{geometry_centroid, sector_for_point};

const OPERATIONS_AMENITIES: &[&str] = &[
    "school",
    "university",
    "college",
    "hospital",
    "clinic",
    "fire_station",
    "police",
    "community_centre",
    "townhall",
    "place_of_worship",
    "public_building",
    "social_facility",
];

const BUILT_UP_LANDUSE: &[&str] = &["residential", "commercial", "industrial", "retail"];

/// The feature's own `category`, or `Unknown` when missing or unrecognized.
pub fn resolve_feature_category(properties: &FeatureProperties) -> Category {
    properties
        .category
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

/// Derive `(feature_type, category)` from raw OSM tags held in `extra`.
pub fn categorize_osm_tags(properties: &FeatureProperties) -> (&'static str, Category) {
    let tag = |key: &str| properties.extra_str(key).filter(|value| !value.is_empty());

    if let Some(amenity) = tag("amenity") {
        if OPERATIONS_AMENITIES.contains(&amenity) {
            return ("amenity", Category::Operations);
        }
    }
    if let Some(landuse) = tag("landuse") {
        if BUILT_UP_LANDUSE.contains(&landuse) {
            return ("landuse", Category::Risk);
        }
        return ("landuse", Category::Staging);
    }
    if tag("leisure").is_some() {
        return ("leisure", Category::Staging);
    }
    if tag("natural").is_some() {
        return ("natural", Category::Staging);
    }
    if properties.extra.contains_key("highway") {
        return ("highway", Category::Access);
    }
    if properties.extra.contains_key("building") {
        return ("building", Category::Risk);
    }
    ("unknown", Category::Unknown)
}

/// Human readable label built from OSM tags.
pub fn readable_name(properties: &FeatureProperties, feature_type: &str) -> String {
    if let Some(name) = properties.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.trim().to_string();
    }
    let tag = |key: &str| properties.extra_str(key).filter(|value| !value.is_empty());

    if let Some(amenity) = tag("amenity") {
        return title_case(amenity);
    }
    if let Some(landuse) = tag("landuse") {
        return format!("{} area", title_case(landuse));
    }
    if let Some(leisure) = tag("leisure") {
        return title_case(leisure);
    }
    if let Some(natural) = tag("natural") {
        return title_case(natural);
    }
    if let Some(highway) = tag("highway") {
        return format!("{} road", title_case(highway));
    }
    if properties.extra.contains_key("building") {
        return match tag("building") {
            Some(kind) if kind != "yes" => title_case(kind),
            _ => "Building".to_string(),
        };
    }
    feature_type.to_string()
}

/// Fill `category`, `feature_type`, `name` and `sector` on a raw OSM feature.
///
/// Values already present on the feature are left alone.
pub fn tag_osm_feature(feature: &Feature, focal: LatLng, cell_size_deg: f64) -> Feature {
    let mut tagged = feature.clone();
    let properties = tagged.properties.get_or_insert_with(FeatureProperties::default);

    let (feature_type, category) = categorize_osm_tags(properties);
    if properties.feature_type.is_none() {
        properties.feature_type = Some(feature_type.to_string());
    }
    if properties.category.is_none() {
        properties.category = Some(category.as_str().to_string());
    }
    if properties.name.is_none() {
        properties.name = Some(readable_name(properties, feature_type));
    }
    if properties.sector.is_none() {
        if let Some(centroid) = feature.geometry.as_ref().and_then(geometry_centroid) {
            let tag = sector_for_point(centroid, focal, cell_size_deg);
            properties.sector = Some(tag.as_str().to_string());
        }
    }
    tagged
}

fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
