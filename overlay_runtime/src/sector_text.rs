use std::collections::BTreeMap;

use lazy_static::lazy_static;
use overlay_schema::DirectionalTag;
use regex::Regex;

/// Tag → description, ordered the same way as [`DirectionalTag::ALL`].
pub type SectorTextMap = BTreeMap<DirectionalTag, String>;

lazy_static! {
    static ref TAG_MARKER: Regex = Regex::new(r"(?i)\[(NW|NE|SW|SE|N|S|E|W|C)\]")
        .expect("sector tag marker pattern should compile");
}

/// Extract `[TAG] description` runs from free text.
///
/// A description spans from the end of its marker to the start of the next
/// marker (or the end of the text). Only the first occurrence of a tag is
/// used; a first occurrence with no text still claims the tag, and the tag is
/// then left out of the map. Markers that are not one of the nine grid tags
/// are ordinary text.
pub fn parse_sector_text(text: &str) -> SectorTextMap {
    let markers: Vec<(DirectionalTag, usize, usize)> = TAG_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag = caps.get(1)?.as_str().parse().ok()?;
            Some((tag, whole.start(), whole.end()))
        })
        .collect();

    let mut sectors = SectorTextMap::new();
    let mut claimed = [false; 9];
    for (position, &(tag, _, body_start)) in markers.iter().enumerate() {
        if claimed[tag.index()] {
            continue;
        }
        claimed[tag.index()] = true;

        let body_end = markers
            .get(position + 1)
            .map(|&(_, next_start, _)| next_start)
            .unwrap_or(text.len());
        let description = normalize_description(&text[body_start..body_end]);
        if !description.is_empty() {
            sectors.insert(tag, description);
        }
    }
    sectors
}

/// Render a map back to one `[TAG] description` line per entry in grid order.
pub fn render_sector_text(sectors: &SectorTextMap) -> String {
    DirectionalTag::ALL
        .iter()
        .filter_map(|tag| {
            sectors
                .get(tag)
                .map(|description| format!("[{}] {}", tag.as_str(), description))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_description(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
