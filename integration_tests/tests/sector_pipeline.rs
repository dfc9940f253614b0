mod common;

use core_overlay::{
    build_tactical_overlay, AnalysisInput, Category, CategorySet, DirectionalTag, OverlayConfig,
    SectorSource,
};

#[test]
fn text_only_briefing_assembles_nine_sectors() -> anyhow::Result<()> {
    let input: AnalysisInput = common::load_fixture("analysis_text_only.json")?;
    let overlay = build_tactical_overlay(&input, &OverlayConfig::builtin());

    assert_eq!(overlay.name, "Gaza City");
    assert_eq!(overlay.sectors.len(), 9);

    let nw = overlay.sector(DirectionalTag::NW);
    assert_eq!((nw.description.as_str(), nw.category), ("Open field.", Category::Staging));
    let n = overlay.sector(DirectionalTag::N);
    assert_eq!((n.description.as_str(), n.category), ("Dense buildings.", Category::Risk));
    let c = overlay.sector(DirectionalTag::C);
    assert_eq!((c.description.as_str(), c.category), ("Courtyard.", Category::Unknown));

    let silent: Vec<DirectionalTag> = overlay
        .sectors
        .iter()
        .filter(|sector| sector.source == SectorSource::NoIntel)
        .map(|sector| sector.tag)
        .collect();
    assert_eq!(
        silent,
        vec![
            DirectionalTag::NE,
            DirectionalTag::W,
            DirectionalTag::E,
            DirectionalTag::SW,
            DirectionalTag::S,
            DirectionalTag::SE,
        ]
    );
    for tag in silent {
        let sector = overlay.sector(tag);
        assert_eq!(sector.category, Category::Unknown);
        assert_eq!(sector.description, "No intel");
    }
    Ok(())
}

#[test]
fn structured_features_take_precedence() -> anyhow::Result<()> {
    let input: AnalysisInput = common::load_fixture("analysis_with_features.json")?;
    let overlay = build_tactical_overlay(&input, &OverlayConfig::builtin());

    let east = overlay.sector(DirectionalTag::E);
    assert_eq!(east.category, Category::Operations);
    assert_eq!(east.source, SectorSource::Feature);
    assert_eq!(east.description, "Road access along the eastern edge.");

    let north_west = overlay.sector(DirectionalTag::NW);
    assert_eq!(north_west.category, Category::Staging);
    assert_eq!(north_west.description, "Cleared lot behind the depot");

    let west = overlay.sector(DirectionalTag::W);
    assert_eq!(west.source, SectorSource::SectorsMap);
    assert_eq!(west.description, "Open field suitable for a landing zone");
    assert_eq!(west.category, Category::Staging);

    let south_west = overlay.sector(DirectionalTag::SW);
    assert_eq!(south_west.category, Category::Risk);

    let south = overlay.sector(DirectionalTag::S);
    assert_eq!(south.source, SectorSource::AnalysisText);
    assert_eq!(south.category, Category::Risk);

    assert_eq!(overlay.sector(DirectionalTag::NE).source, SectorSource::NoIntel);
    assert_eq!(overlay.active_categories, CategorySet::all());
    Ok(())
}

#[test]
fn features_are_styled_and_placed() -> anyhow::Result<()> {
    let input: AnalysisInput = common::load_fixture("analysis_with_features.json")?;
    let overlay = build_tactical_overlay(&input, &OverlayConfig::builtin());

    assert_eq!(overlay.features.len(), 4);
    let bypass = overlay
        .features
        .iter()
        .find(|feature| feature.name == "Southern bypass")
        .expect("bypass feature styled");
    assert!(bypass.line_like);
    assert!(bypass.fill.is_none());
    assert_eq!(bypass.sector, Some(DirectionalTag::S));

    let lot = &overlay.features[1];
    assert!(!lot.line_like);
    assert_eq!(lot.fill.map(|fill| fill.rgb()), Some(Category::Staging.color()));
    Ok(())
}

#[test]
fn overlay_serializes_for_the_map_layer() -> anyhow::Result<()> {
    let input: AnalysisInput = common::load_fixture("analysis_with_features.json")?;
    let overlay = build_tactical_overlay(&input, &OverlayConfig::builtin());
    let value = serde_json::to_value(&overlay)?;

    let sectors = value["sectors"].as_array().expect("sectors array");
    assert_eq!(sectors.len(), 9);
    assert_eq!(sectors[5]["tag"], "E");
    assert_eq!(sectors[5]["category"], "operations");
    assert_eq!(sectors[5]["source"], "feature");
    Ok(())
}

#[test]
fn repeated_assembly_is_deterministic() -> anyhow::Result<()> {
    let input: AnalysisInput = common::load_fixture("analysis_with_features.json")?;
    let config = OverlayConfig::builtin();
    assert_eq!(
        build_tactical_overlay(&input, &config),
        build_tactical_overlay(&input, &config)
    );
    Ok(())
}
