//! Domain-relative score coloring for choropleth rendering.

use overlay_runtime::{Rgb, Rgba, ScoreTable};
use serde::Serialize;

use crate::choropleth_config::ChoroplethConfig;

/// Observed `[min, max]` over the active scores. Either side may be missing
/// (all-positive or all-negative scores), and `min == max` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreDomain {
    pub min: f64,
    pub max: f64,
}

impl ScoreDomain {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Domain of the finite scores, or `None` when there are none.
    pub fn from_scores<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        scores
            .into_iter()
            .filter(|score| score.is_finite())
            .fold(None, |domain: Option<ScoreDomain>, score| {
                Some(match domain {
                    Some(d) => ScoreDomain {
                        min: d.min.min(score),
                        max: d.max.max(score),
                    },
                    None => ScoreDomain {
                        min: score,
                        max: score,
                    },
                })
            })
    }

    pub fn from_table(table: &ScoreTable) -> Option<Self> {
        Self::from_scores(table.finite_values())
    }

    /// Larger of `|min|` and `|max|`.
    pub fn peak_magnitude(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

/// Which half of the diverging ramp a score falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSide {
    Deficit,
    Surplus,
}

impl ScoreSide {
    pub fn of(score: f64) -> Self {
        if score < 0.0 {
            ScoreSide::Deficit
        } else {
            ScoreSide::Surplus
        }
    }
}

/// Maps scores to a diverging ramp that meets at the neutral color at zero.
#[derive(Debug, Clone, Copy)]
pub struct ScoreColorMapper<'a> {
    config: &'a ChoroplethConfig,
    domain: ScoreDomain,
}

impl<'a> ScoreColorMapper<'a> {
    pub fn new(config: &'a ChoroplethConfig, domain: ScoreDomain) -> Self {
        Self { config, domain }
    }

    pub fn domain(&self) -> ScoreDomain {
        self.domain
    }

    /// Position in `[0, 1]` along the score's own side of the ramp.
    pub fn ramp_position(&self, score: f64) -> f64 {
        if !score.is_finite() {
            return 0.0;
        }
        let ScoreDomain { min: lo, max: hi } = self.domain;
        let t = match ScoreSide::of(score) {
            ScoreSide::Deficit if lo < 0.0 => score / lo,
            ScoreSide::Surplus if hi > 0.0 => score / hi,
            _ => 0.0,
        };
        t.clamp(0.0, 1.0)
    }

    pub fn color(&self, score: f64) -> Rgb {
        let extreme = match ScoreSide::of(score) {
            ScoreSide::Deficit => self.config.deficit_extreme(),
            ScoreSide::Surplus => self.config.surplus_extreme(),
        };
        self.config
            .neutral()
            .lerp(extreme, self.ramp_position(score))
    }

    /// Top face of an extruded polygon.
    pub fn cap_color(&self, score: f64) -> Rgba {
        self.color(score).with_alpha(self.config.cap_opacity())
    }

    /// Same hue as the cap at reduced opacity, for extrusion walls.
    pub fn side_color(&self, score: f64) -> Rgba {
        self.color(score).with_alpha(self.config.side_opacity())
    }

    /// `|score|` relative to the domain's peak magnitude, so deficits and
    /// surpluses of equal size extrude equally.
    pub fn magnitude(&self, score: f64) -> f64 {
        let peak = self.domain.peak_magnitude();
        if !score.is_finite() || peak <= 0.0 || !peak.is_finite() {
            return 0.0;
        }
        (score.abs() / peak).clamp(0.0, 1.0)
    }

    pub fn altitude(&self, score: f64) -> f64 {
        self.config.base_altitude() + self.magnitude(score) * self.config.altitude_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(config: &ChoroplethConfig, min: f64, max: f64) -> ScoreColorMapper<'_> {
        ScoreColorMapper::new(config, ScoreDomain::new(min, max))
    }

    #[test]
    fn domain_skips_non_finite_scores() {
        let domain = ScoreDomain::from_scores([3.0, f64::NAN, -2.0, f64::INFINITY]).unwrap();
        assert_eq!(domain, ScoreDomain::new(-2.0, 3.0));
        assert_eq!(ScoreDomain::from_scores([f64::NAN]), None);
        assert_eq!(ScoreDomain::from_scores(Vec::new()), None);
    }

    #[test]
    fn extremes_reach_configured_colors() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, -50.0, 200.0);
        assert_eq!(m.color(-50.0), config.deficit_extreme());
        assert_eq!(m.color(200.0), config.surplus_extreme());
        assert_eq!(m.color(-500.0), config.deficit_extreme());
        assert_eq!(m.color(0.0), config.neutral());
    }

    #[test]
    fn color_is_continuous_at_zero() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, -10.0, 10.0);
        let below = m.color(-1e-9);
        let above = m.color(1e-9);
        assert_eq!(below, config.neutral());
        assert_eq!(above, config.neutral());
    }

    #[test]
    fn degenerate_domain_gives_neutral_and_zero_magnitude() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, 0.0, 0.0);
        for score in [0.0, 5.0, -5.0] {
            assert_eq!(m.color(score), config.neutral());
            assert_eq!(m.magnitude(score), 0.0);
            assert_eq!(m.altitude(score), config.base_altitude());
        }
    }

    #[test]
    fn one_sided_domain_keeps_other_side_neutral() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, 2.0, 8.0);
        assert_eq!(m.color(-3.0), config.neutral());
        assert_eq!(m.color(8.0), config.surplus_extreme());
    }

    #[test]
    fn ramp_is_monotonic_within_each_side() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, -40.0, 10.0);
        let mut previous = 0.0;
        for step in 1..=40 {
            let t = m.ramp_position(-(step as f64));
            assert!(t >= previous);
            previous = t;
        }
        assert_eq!(m.ramp_position(5.0), 0.5);
    }

    #[test]
    fn magnitude_is_symmetric() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, -100.0, 25.0);
        assert_eq!(m.magnitude(-100.0), 1.0);
        assert_eq!(m.magnitude(25.0), 0.25);
        assert_eq!(m.magnitude(-25.0), m.magnitude(25.0));
        assert!(m.altitude(-100.0) > m.altitude(25.0));
    }

    #[test]
    fn side_color_shares_cap_hue() {
        let config = ChoroplethConfig::default();
        let m = mapper(&config, -1.0, 1.0);
        let cap = m.cap_color(0.5);
        let side = m.side_color(0.5);
        assert_eq!(cap.rgb(), side.rgb());
        assert!(side.a < cap.a);
    }
}
