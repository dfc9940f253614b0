use core_overlay::{
    build_tactical_overlay, AnalysisInput, Feature, FeatureCollection, FeatureProperties,
    GlobeStyler, OverlayConfig, ScoreMode, ScoreTable,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

const ANALYSIS: &str = "[NW] Open field with a flat clearing. [N] Dense buildings and rubble. \
    [NE] Narrow street, debris. [W] Main road and bridge access. [C] Courtyard. \
    [E] School used as shelter. [SW] Park and meadow. [S] Highway entrance gate. \
    [SE] Collapsed warehouse, unstable.";

fn analysis_with_features(count: usize) -> AnalysisInput {
    let tags = ["NW", "N", "NE", "W", "C", "E", "SW", "S", "SE"];
    let categories = ["staging", "risk", "access", "operations"];
    let features = (0..count)
        .map(|i| Feature {
            id: Some(json!(i)),
            geometry: serde_json::from_value(json!({
                "type": "Point",
                "coordinates": [34.4668 + (i % 7) as f64 * 0.0003, 31.5017 - (i % 5) as f64 * 0.0003]
            }))
            .ok(),
            properties: Some(FeatureProperties {
                category: Some(categories[i % categories.len()].to_string()),
                sector: (i % 3 == 0).then(|| tags[i % tags.len()].to_string()),
                ..FeatureProperties::default()
            }),
        })
        .collect();
    AnalysisInput {
        lat: 31.5017,
        lng: 34.4668,
        name: "Bench".to_string(),
        analysis: ANALYSIS.to_string(),
        geojson: Some(FeatureCollection { features }),
        ..AnalysisInput::default()
    }
}

fn bench_assemble(c: &mut Criterion) {
    let config = OverlayConfig::builtin();
    let mut group = c.benchmark_group("assemble");

    for count in [0usize, 16, 128, 1024] {
        let input = analysis_with_features(count);
        group.bench_with_input(BenchmarkId::new("features", count), &input, |b, input| {
            b.iter(|| build_tactical_overlay(input, &config))
        });
    }

    group.finish();
}

fn bench_globe(c: &mut Criterion) {
    let config = OverlayConfig::builtin();
    let shapes = FeatureCollection {
        features: (1..=894)
            .step_by(4)
            .map(|id| Feature {
                id: Some(json!(format!("{id:03}"))),
                ..Feature::default()
            })
            .collect(),
    };
    let scores: ScoreTable = shapes
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let code = config
                .countries
                .resolve(feature.id_string().as_deref(), None)
                .code;
            (code, i as f64 - 100.0)
        })
        .collect();

    c.bench_function("globe/style_collection", |b| {
        b.iter(|| {
            let styler = GlobeStyler::new(&config, &scores, ScoreMode::FundingGap);
            styler.style_collection(&shapes)
        })
    });
}

criterion_group!(overlay_benches, bench_assemble, bench_globe);
criterion_main!(overlay_benches);
