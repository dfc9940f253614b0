//! Per-country choropleth styling for the score globe.

use overlay_runtime::{Feature, FeatureCollection, Rgb, Rgba, ScoreMode, ScoreTable};
use serde::Serialize;

use crate::choropleth_config::ChoroplethConfig;
use crate::config::OverlayConfig;
use crate::country::{CountryCodeTable, ResolutionMethod};
use crate::score::{ScoreColorMapper, ScoreDomain};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStyle {
    /// Empty when the shape could not be identified.
    pub code: String,
    pub method: ResolutionMethod,
    pub score: Option<f64>,
    pub cap: Rgba,
    pub side: Rgba,
    pub altitude: f64,
}

impl CountryStyle {
    pub fn has_data(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLegend {
    pub mode: ScoreMode,
    /// `None` when no country has a finite score.
    pub domain: Option<ScoreDomain>,
    pub deficit_label: &'static str,
    pub surplus_label: &'static str,
    pub deficit_color: Rgb,
    pub neutral_color: Rgb,
    pub surplus_color: Rgb,
    pub no_data_color: Rgb,
}

pub struct GlobeStyler<'a> {
    countries: &'a CountryCodeTable,
    choropleth: &'a ChoroplethConfig,
    scores: &'a ScoreTable,
    mode: ScoreMode,
    domain: Option<ScoreDomain>,
}

impl<'a> GlobeStyler<'a> {
    /// The domain is computed once here; build a new styler when the scores
    /// or mode change.
    pub fn new(config: &'a OverlayConfig, scores: &'a ScoreTable, mode: ScoreMode) -> Self {
        let domain = ScoreDomain::from_table(scores);
        tracing::debug!(
            target: "tactical::globe",
            mode = mode.as_str(),
            countries = scores.len(),
            min = domain.map(|d| d.min),
            max = domain.map(|d| d.max),
            "globe.domain"
        );
        Self {
            countries: &config.countries,
            choropleth: &config.choropleth,
            scores,
            mode,
            domain,
        }
    }

    pub fn domain(&self) -> Option<ScoreDomain> {
        self.domain
    }

    fn mapper(&self) -> ScoreColorMapper<'a> {
        ScoreColorMapper::new(self.choropleth, self.domain.unwrap_or_default())
    }

    pub fn style_feature(&self, feature: &Feature) -> CountryStyle {
        let numeric_id = feature.id_string();
        let resolution = self
            .countries
            .resolve(numeric_id.as_deref(), feature.props());
        let score = if resolution.is_resolved() {
            self.scores.get(&resolution.code)
        } else {
            None
        };

        let (cap, side, altitude) = match score {
            Some(score) => {
                let mapper = self.mapper();
                (
                    mapper.cap_color(score),
                    mapper.side_color(score),
                    mapper.altitude(score),
                )
            }
            None => {
                let no_data = self.choropleth.no_data();
                (
                    no_data.with_alpha(self.choropleth.cap_opacity()),
                    no_data.with_alpha(self.choropleth.side_opacity()),
                    self.choropleth.base_altitude(),
                )
            }
        };

        CountryStyle {
            code: resolution.code,
            method: resolution.method,
            score,
            cap,
            side,
            altitude,
        }
    }

    pub fn style_collection(&self, shapes: &FeatureCollection) -> Vec<CountryStyle> {
        let styles: Vec<CountryStyle> = shapes
            .features
            .iter()
            .map(|feature| self.style_feature(feature))
            .collect();
        let degraded = styles
            .iter()
            .filter(|style| style.method == ResolutionMethod::RawNumeric)
            .count();
        tracing::debug!(
            target: "tactical::globe",
            shapes = styles.len(),
            with_data = styles.iter().filter(|s| s.has_data()).count(),
            degraded,
            "globe.styled"
        );
        styles
    }

    pub fn legend(&self) -> ScoreLegend {
        ScoreLegend {
            mode: self.mode,
            domain: self.domain,
            deficit_label: self.mode.deficit_label(),
            surplus_label: self.mode.surplus_label(),
            deficit_color: self.choropleth.deficit_extreme(),
            neutral_color: self.choropleth.neutral(),
            surplus_color: self.choropleth.surplus_extreme(),
            no_data_color: self.choropleth.no_data(),
        }
    }
}

/// Re-key a score table to three-letter codes. Names and aliases go through
/// the country name table first, so `"UAE"` becomes `ARE`; other three-letter
/// keys are taken as codes and uppercased. Anything else is dropped.
pub fn canonicalize_score_keys(scores: &ScoreTable, countries: &CountryCodeTable) -> ScoreTable {
    let mut canonical = ScoreTable::default();
    for (key, score) in &scores.0 {
        let trimmed = key.trim();
        let code = countries
            .code_for_name(trimmed)
            .map(str::to_string)
            .or_else(|| {
                (trimmed.len() == 3 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()))
                    .then(|| trimmed.to_ascii_uppercase())
            });
        match code {
            Some(code) => {
                canonical.0.entry(code).or_insert(*score);
            }
            None => {
                tracing::debug!(target: "tactical::globe", key = %key, "scores.unmatched_key");
            }
        }
    }
    canonical
}
