//! Data contracts shared by the tactical overlay crates.
//!
//! Everything here is plain data: the nine directional grid tags, the
//! category palette, lat/lng geometry primitives, the GeoJSON shapes consumed
//! from upstream, and the records handed to the rendering layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Description used for any sector without usable intel.
pub const NO_INTEL: &str = "No intel";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaParseError {
    #[error("unknown directional tag '{0}'")]
    UnknownTag(String),
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown score mode '{0}'")]
    UnknownScoreMode(String),
}

/// One cell of the 3×3 tactical grid. `C` is the focal cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum DirectionalTag {
    NW,
    N,
    NE,
    W,
    C,
    E,
    SW,
    S,
    SE,
}

impl DirectionalTag {
    /// Row-major order, north row first.
    pub const ALL: [DirectionalTag; 9] = [
        DirectionalTag::NW,
        DirectionalTag::N,
        DirectionalTag::NE,
        DirectionalTag::W,
        DirectionalTag::C,
        DirectionalTag::E,
        DirectionalTag::SW,
        DirectionalTag::S,
        DirectionalTag::SE,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DirectionalTag::NW => "NW",
            DirectionalTag::N => "N",
            DirectionalTag::NE => "NE",
            DirectionalTag::W => "W",
            DirectionalTag::C => "C",
            DirectionalTag::E => "E",
            DirectionalTag::SW => "SW",
            DirectionalTag::S => "S",
            DirectionalTag::SE => "SE",
        }
    }

    /// Unit offset as `(dlat, dlng)`; north and east are positive.
    pub fn offset(self) -> (i8, i8) {
        match self {
            DirectionalTag::NW => (1, -1),
            DirectionalTag::N => (1, 0),
            DirectionalTag::NE => (1, 1),
            DirectionalTag::W => (0, -1),
            DirectionalTag::C => (0, 0),
            DirectionalTag::E => (0, 1),
            DirectionalTag::SW => (-1, -1),
            DirectionalTag::S => (-1, 0),
            DirectionalTag::SE => (-1, 1),
        }
    }

    pub fn from_offset(dlat: i8, dlng: i8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.offset() == (dlat, dlng))
    }

    /// Position in [`DirectionalTag::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DirectionalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectionalTag {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| SchemaParseError::UnknownTag(token.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation per channel; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let channel =
            |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round().clamp(0.0, 255.0) as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Coarse operational meaning of a map region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Staging,
    Risk,
    Access,
    Operations,
    Unknown,
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Staging,
        Category::Risk,
        Category::Access,
        Category::Operations,
        Category::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Staging => "staging",
            Category::Risk => "risk",
            Category::Access => "access",
            Category::Operations => "operations",
            Category::Unknown => "unknown",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Staging => "Staging",
            Category::Risk => "Risk",
            Category::Access => "Access",
            Category::Operations => "Operations",
            Category::Unknown => "Unknown",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Category::Staging => Rgb::new(46, 204, 113),
            Category::Risk => Rgb::new(231, 76, 60),
            Category::Access => Rgb::new(52, 152, 219),
            Category::Operations => Rgb::new(241, 196, 15),
            Category::Unknown => Rgb::new(149, 165, 166),
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Category::Unknown
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| SchemaParseError::UnknownCategory(token.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around(center: LatLng, half_extent: f64) -> Self {
        Self {
            south: center.lat - half_extent,
            west: center.lng - half_extent,
            north: center.lat + half_extent,
            east: center.lng + half_extent,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    /// Area shared with `other`, zero when they only touch along an edge.
    pub fn overlap_area(&self, other: &Bounds) -> f64 {
        let lat = (self.north.min(other.north) - self.south.max(other.south)).max(0.0);
        let lng = (self.east.min(other.east) - self.west.max(other.west)).max(0.0);
        lat * lng
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    /// `[[south, west], [north, east]]`, the corner pair map layers expect.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

/// GeoJSON geometry kept loosely typed; only centroids and the line/area
/// distinction are ever derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    pub fn is_line_like(&self) -> bool {
        matches!(self.kind.as_str(), "LineString" | "MultiLineString")
    }

    /// Every `[lng, lat, ..]` position in the geometry, in document order.
    pub fn positions(&self) -> Vec<LatLng> {
        let mut out = Vec::new();
        collect_positions(&self.coordinates, &mut out);
        out
    }
}

fn collect_positions(value: &Value, out: &mut Vec<LatLng>) {
    let Value::Array(items) = value else {
        return;
    };
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(lng), Some(lat)) => out.push(LatLng::new(lat, lng)),
        _ => {
            for item in items {
                collect_positions(item, out);
            }
        }
    }
}

/// Metadata attached to an upstream feature. Unrecognized keys (raw OSM tags,
/// Natural Earth attributes) are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FeatureProperties {
    pub category: Option<String>,
    pub sector: Option<String>,
    pub sector_description: Option<String>,
    pub name: Option<String>,
    pub feature_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FeatureProperties {
    /// The declared sector tag, if present and recognizable.
    pub fn declared_sector(&self) -> Option<DirectionalTag> {
        self.sector.as_deref().and_then(|raw| raw.parse().ok())
    }

    /// A string-valued entry from `extra`.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
}

impl Feature {
    pub fn props(&self) -> Option<&FeatureProperties> {
        self.properties.as_ref()
    }

    /// The feature id rendered as text; integral numbers print without a
    /// fractional part.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(number) => match number.as_u64() {
                Some(value) => Some(value.to_string()),
                None => number
                    .as_i64()
                    .map(|value| value.to_string())
                    .or_else(|| Some(number.to_string())),
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Analysis payload produced by the upstream briefing service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisInput {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub analysis: String,
    /// Pre-synthesized tag → description map; keys are matched case-insensitively.
    pub sectors: BTreeMap<String, String>,
    pub geojson: Option<FeatureCollection>,
    pub annotated_image: Option<String>,
}

impl AnalysisInput {
    pub fn focal(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn features(&self) -> &[Feature] {
        self.geojson
            .as_ref()
            .map(|collection| collection.features.as_slice())
            .unwrap_or(&[])
    }
}

/// Where a sector's description and category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorSource {
    Feature,
    SectorsMap,
    AnalysisText,
    NoIntel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    pub tag: DirectionalTag,
    pub description: String,
    pub category: Category,
    pub color: Rgb,
    pub bounds: Bounds,
    pub source: SectorSource,
}

impl fmt::Display for SectorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<2} {:<10} {}",
            self.tag.as_str(),
            self.category.as_str(),
            self.description
        )
    }
}

/// Which per-country scalar the globe is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    FundingGap,
    CrisisScore,
}

impl ScoreMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMode::FundingGap => "funding_gap",
            ScoreMode::CrisisScore => "crisis_score",
        }
    }

    /// Legend label for the negative side of the domain.
    pub fn deficit_label(self) -> &'static str {
        match self {
            ScoreMode::FundingGap => "Funding shortfall",
            ScoreMode::CrisisScore => "Easing",
        }
    }

    /// Legend label for the positive side of the domain.
    pub fn surplus_label(self) -> &'static str {
        match self {
            ScoreMode::FundingGap => "Funding surplus",
            ScoreMode::CrisisScore => "Escalating",
        }
    }
}

impl FromStr for ScoreMode {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "funding_gap" | "funding" | "gap" => Ok(ScoreMode::FundingGap),
            "crisis_score" | "crisis" => Ok(ScoreMode::CrisisScore),
            other => Err(SchemaParseError::UnknownScoreMode(other.to_string())),
        }
    }
}

/// Country code → scalar score. Missing keys mean "no data", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ScoreTable(pub BTreeMap<String, f64>);

impl ScoreTable {
    /// Finite score for `code`, matched case-insensitively.
    pub fn get(&self, code: &str) -> Option<f64> {
        let value = match self.0.get(code) {
            Some(value) => Some(*value),
            None => self
                .0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code))
                .map(|(_, value)| *value),
        };
        value.filter(|score| score.is_finite())
    }

    /// All finite scores.
    pub fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied().filter(|score| score.is_finite())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        ScoreTable(iter.into_iter().collect())
    }
}
