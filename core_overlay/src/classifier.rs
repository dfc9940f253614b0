use overlay_runtime::Category;

use crate::keyword_config::KeywordTable;

/// Pick the category with the most distinct keyword hits in `description`.
///
/// Matching is plain substring search on the lowercased text, so a keyword
/// also matches inside longer words. Ties go to the entry listed first in the
/// table; no hits at all gives [`Category::Unknown`].
pub fn classify_description(description: &str, table: &KeywordTable) -> Category {
    let lowered = description.to_lowercase();
    let mut best = Category::Unknown;
    let mut best_hits = 0;
    for entry in table.entries() {
        let hits = entry.hits(&lowered);
        if hits > best_hits {
            best = entry.category;
            best_hits = hits;
        }
    }
    best
}

/// Per-category hit counts in table order, for explaining a classification.
pub fn keyword_scores(description: &str, table: &KeywordTable) -> Vec<(Category, usize)> {
    let lowered = description.to_lowercase();
    table
        .entries()
        .iter()
        .map(|entry| (entry.category, entry.hits(&lowered)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword_config::KeywordEntry;

    fn table(entries: &[(Category, &[&str])]) -> KeywordTable {
        KeywordTable::from_entries(
            entries
                .iter()
                .map(|(category, keywords)| KeywordEntry {
                    category: *category,
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn highest_hit_count_wins() {
        let table = table(&[
            (Category::Staging, &["open", "field"]),
            (Category::Risk, &["rubble", "debris", "collapse"]),
        ]);
        assert_eq!(
            classify_description("Open ground with rubble, debris", &table),
            Category::Risk
        );
    }

    #[test]
    fn ties_go_to_first_entry() {
        let table = table(&[
            (Category::Access, &["road"]),
            (Category::Risk, &["flood"]),
        ]);
        assert_eq!(
            classify_description("flooded road", &table),
            Category::Access
        );
    }

    #[test]
    fn no_hits_is_unknown() {
        let builtin = KeywordTable::builtin();
        assert_eq!(classify_description("Courtyard.", &builtin), Category::Unknown);
        assert_eq!(classify_description("", &builtin), Category::Unknown);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let table = table(&[
            (Category::Risk, &["rubble"]),
            (Category::Staging, &["open", "flat"]),
        ]);
        assert_eq!(
            classify_description("rubble rubble rubble, open flat lot", &table),
            Category::Staging
        );
    }

    #[test]
    fn keyword_order_within_category_is_irrelevant() {
        let forward = table(&[
            (Category::Operations, &["school", "clinic", "depot"]),
            (Category::Access, &["road", "gate"]),
        ]);
        let shuffled = table(&[
            (Category::Operations, &["depot", "school", "clinic"]),
            (Category::Access, &["gate", "road"]),
        ]);
        for text in ["school gate on the road", "clinic and depot by the gate", "road"] {
            assert_eq!(
                classify_description(text, &forward),
                classify_description(text, &shuffled)
            );
        }
    }

    #[test]
    fn substring_hits_inside_longer_words() {
        let table = table(&[(Category::Access, &["road"])]);
        assert_eq!(classify_description("Broadway", &table), Category::Access);
    }

    #[test]
    fn matching_ignores_case() {
        let builtin = KeywordTable::builtin();
        assert_eq!(classify_description("OPEN FIELD", &builtin), Category::Staging);
        assert_eq!(
            classify_description("Dense buildings.", &builtin),
            Category::Risk
        );
    }

    #[test]
    fn scores_follow_table_order() {
        let builtin = KeywordTable::builtin();
        let scores = keyword_scores("road to the hospital", &builtin);
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0], (Category::Staging, 0));
        assert_eq!(scores[2], (Category::Access, 1));
        assert_eq!(scores[3], (Category::Operations, 1));
    }
}
