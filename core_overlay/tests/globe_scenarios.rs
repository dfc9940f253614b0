use core_overlay::{
    ChoroplethConfig, CountryCodeTable, FeatureCollection, GlobeStyler, OverlayConfig,
    ResolutionMethod, ScoreColorMapper, ScoreDomain, ScoreMode, ScoreTable,
};

fn world() -> FeatureCollection {
    serde_json::from_str(
        r#"{"type": "FeatureCollection", "features": [
            {"id": "032", "properties": {"name": "Argentina"}},
            {"id": 76, "properties": {"name": "Brazil"}},
            {"id": "999", "properties": {"name": "Disputed"}},
            {"id": "-99", "properties": {"ISO_A3": "KOS", "name": "Kosovo"}},
            {"properties": {"name": "Unidentified"}}
        ]}"#,
    )
    .expect("valid shapes")
}

#[test]
fn country_identity_fallbacks() {
    let table = CountryCodeTable::builtin();
    let argentina = table.resolve(Some("032"), None);
    assert_eq!(argentina.code, "ARG");
    assert_eq!(argentina.method, ResolutionMethod::NumericTable);

    let unmapped = table.resolve(Some("999"), None);
    assert_eq!(unmapped.code, "999");
    assert_eq!(unmapped.method, ResolutionMethod::RawNumeric);
}

#[test]
fn globe_styles_every_shape() {
    let config = OverlayConfig::builtin();
    let scores: ScoreTable = [("ARG", -120.0), ("BRA", 30.0), ("KOS", 0.0)]
        .into_iter()
        .map(|(code, score)| (code.to_string(), score))
        .collect();
    let styler = GlobeStyler::new(&config, &scores, ScoreMode::FundingGap);
    let styles = styler.style_collection(&world());

    let codes: Vec<&str> = styles.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["ARG", "BRA", "999", "KOS", ""]);

    let with_data: Vec<bool> = styles.iter().map(|s| s.has_data()).collect();
    assert_eq!(with_data, vec![true, true, false, true, false]);

    assert_eq!(styles[0].cap.rgb(), config.choropleth.deficit_extreme());
    assert!(styles[0].altitude > styles[1].altitude);
    assert_eq!(styles[3].cap.rgb(), config.choropleth.neutral());
    assert_eq!(styles[3].altitude, config.choropleth.base_altitude());
    assert_eq!(styles[4].cap.rgb(), config.choropleth.no_data());
}

#[test]
fn zero_is_the_shared_base_hue() {
    let config = ChoroplethConfig::default();
    let mapper = ScoreColorMapper::new(&config, ScoreDomain::new(-3.0, 7.0));
    let mut deficit = Vec::new();
    let mut surplus = Vec::new();
    for step in 1..=6 {
        let epsilon = 10f64.powi(-step * 2);
        deficit.push(mapper.color(-epsilon));
        surplus.push(mapper.color(epsilon));
    }
    assert_eq!(deficit.last(), Some(&config.neutral()));
    assert_eq!(surplus.last(), Some(&config.neutral()));
    assert_eq!(mapper.color(0.0), config.neutral());
}

#[test]
fn degenerate_zero_domain_is_harmless() {
    let config = ChoroplethConfig::default();
    let mapper = ScoreColorMapper::new(&config, ScoreDomain::new(0.0, 0.0));
    assert_eq!(mapper.color(0.0), config.neutral());
    assert_eq!(mapper.magnitude(0.0), 0.0);
    assert_eq!(mapper.ramp_position(0.0), 0.0);
}
