use std::fmt::Write;

use core_overlay::{
    keyword_scores, CountryStyle, KeywordTable, ScoreLegend, SectorSource, TacticalOverlay,
};

pub fn render_sectors(overlay: &TacticalOverlay, explain: Option<&KeywordTable>) -> String {
    let mut out = String::new();
    let title = if overlay.name.is_empty() {
        "(unnamed)"
    } else {
        overlay.name.as_str()
    };
    let _ = writeln!(
        out,
        "{} @ {:.5}, {:.5}",
        title, overlay.focal.lat, overlay.focal.lng
    );

    for sector in &overlay.sectors {
        let _ = writeln!(out, "{sector}  [{}]", source_label(sector.source));
        if let Some(table) = explain {
            if matches!(
                sector.source,
                SectorSource::SectorsMap | SectorSource::AnalysisText
            ) {
                let hits: Vec<String> = keyword_scores(&sector.description, table)
                    .into_iter()
                    .map(|(category, count)| format!("{category}={count}"))
                    .collect();
                let _ = writeln!(out, "     hits: {}", hits.join(" "));
            }
        }
    }

    let legend = overlay.legend();
    if legend.is_empty() {
        let _ = writeln!(out, "legend: (none)");
    } else {
        let entries: Vec<String> = legend
            .iter()
            .map(|entry| format!("{} {}", entry.label, entry.color.to_hex()))
            .collect();
        let _ = writeln!(out, "legend: {}", entries.join(", "));
    }
    if !overlay.features.is_empty() {
        let _ = writeln!(out, "features: {}", overlay.features.len());
    }
    out
}

pub fn render_globe(styles: &[CountryStyle], legend: &ScoreLegend) -> String {
    let mut out = String::new();
    match legend.domain {
        Some(domain) => {
            let _ = writeln!(
                out,
                "{}: {} {} .. {} {}",
                legend.mode.as_str(),
                legend.deficit_label,
                domain.min,
                domain.max,
                legend.surplus_label
            );
        }
        None => {
            let _ = writeln!(out, "{}: no scores", legend.mode.as_str());
        }
    }
    for style in styles {
        let code = if style.code.is_empty() {
            "?"
        } else {
            style.code.as_str()
        };
        match style.score {
            Some(score) => {
                let _ = writeln!(
                    out,
                    "{code:<5} {score:>12.2} {} alt {:.3}",
                    style.cap.rgb().to_hex(),
                    style.altitude
                );
            }
            None => {
                let _ = writeln!(out, "{code:<5} {:>12} {}", "no data", style.cap.rgb().to_hex());
            }
        }
    }
    out
}

fn source_label(source: SectorSource) -> &'static str {
    match source {
        SectorSource::Feature => "feature",
        SectorSource::SectorsMap => "sectors",
        SectorSource::AnalysisText => "text",
        SectorSource::NoIntel => "none",
    }
}
