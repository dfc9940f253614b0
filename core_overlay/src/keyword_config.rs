//! Keyword table driving heuristic sector classification.
//!
//! Loaded from `keyword_table.json`; the entry order is the tie-break order.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use overlay_runtime::Category;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{load_with_override, ConfigMetadata};

pub const BUILTIN_KEYWORD_TABLE: &str = include_str!("data/keyword_table.json");

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordEntry {
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KeywordEntry {
    /// Number of distinct keywords present in `lowered`; repeats in the text
    /// count once.
    pub fn hits(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .count()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordTable {
    #[serde(rename = "categories", default)]
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_KEYWORD_TABLE).expect("builtin keyword table should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, KeywordTableError> {
        let table: KeywordTable = serde_json::from_str(json)?;
        Self::from_entries(table.entries)
    }

    pub fn from_file(path: &Path) -> Result<Self, KeywordTableError> {
        let contents = fs::read_to_string(path).map_err(|source| KeywordTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Build a table from entries, normalizing keywords to trimmed lowercase
    /// and dropping blanks and repeats.
    pub fn from_entries(entries: Vec<KeywordEntry>) -> Result<Self, KeywordTableError> {
        let mut seen_categories = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.category.is_unknown() {
                return Err(KeywordTableError::UnknownCategoryEntry);
            }
            if !seen_categories.insert(entry.category) {
                return Err(KeywordTableError::DuplicateCategory(entry.category));
            }
            let mut seen_keywords = HashSet::new();
            let keywords = entry
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty() && seen_keywords.insert(keyword.clone()))
                .collect();
            normalized.push(KeywordEntry {
                category: entry.category,
                keywords,
            });
        }
        Ok(Self {
            entries: normalized,
        })
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn keywords_for(&self, category: Category) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.keywords.as_slice())
    }
}

#[derive(Debug, Error)]
pub enum KeywordTableError {
    #[error("failed to parse keyword table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read keyword table from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("keyword table may not list the unknown category")]
    UnknownCategoryEntry,
    #[error("keyword table lists category '{0}' more than once")]
    DuplicateCategory(Category),
}

pub fn load_keyword_table_from_env() -> (Arc<KeywordTable>, ConfigMetadata) {
    load_with_override(
        "keyword_table",
        "KEYWORD_TABLE_PATH",
        "keyword_table.json",
        KeywordTable::from_file,
        KeywordTable::builtin,
    )
}
