//! Canonical three-letter country codes for globe shapes and score tables.

use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use overlay_runtime::FeatureProperties;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{load_with_override, ConfigMetadata};

pub const BUILTIN_COUNTRY_TABLE: &str = include_str!("data/country_codes.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CountryTableFile {
    property_keys: Vec<String>,
    sentinels: Vec<String>,
    numeric: BTreeMap<String, String>,
    names: BTreeMap<String, String>,
}

/// How a [`CountryResolution`] was reached, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Property,
    NumericTable,
    /// The padded numeric id itself; degraded but usable as a key.
    RawNumeric,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryResolution {
    /// Empty when unresolved.
    pub code: String,
    pub method: ResolutionMethod,
}

impl CountryResolution {
    fn new(code: impl Into<String>, method: ResolutionMethod) -> Self {
        Self {
            code: code.into(),
            method,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.method != ResolutionMethod::Unresolved
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryCodeTable {
    property_keys: Vec<String>,
    sentinels: HashSet<String>,
    numeric: BTreeMap<String, String>,
    names: BTreeMap<String, String>,
}

impl CountryCodeTable {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_COUNTRY_TABLE)
                .expect("builtin country table should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, CountryTableError> {
        let file: CountryTableFile = serde_json::from_str(json)?;
        let mut numeric = BTreeMap::new();
        for (id, code) in file.numeric {
            let key = pad_numeric(&id)
                .ok_or_else(|| CountryTableError::InvalidNumericId(id.clone()))?;
            if !is_alpha3(&code) {
                return Err(CountryTableError::InvalidCode { key: id, code });
            }
            numeric.insert(key, code.to_ascii_uppercase());
        }
        let mut names = BTreeMap::new();
        for (name, code) in file.names {
            if !is_alpha3(&code) {
                return Err(CountryTableError::InvalidCode { key: name, code });
            }
            names.insert(name.trim().to_lowercase(), code.to_ascii_uppercase());
        }
        // Only three-letter values ever reach the sentinel check.
        let mut sentinels = HashSet::new();
        for sentinel in file.sentinels {
            let trimmed = sentinel.trim();
            if !is_alpha3(trimmed) {
                return Err(CountryTableError::InvalidCode {
                    key: "sentinels".to_string(),
                    code: sentinel,
                });
            }
            sentinels.insert(trimmed.to_ascii_uppercase());
        }
        Ok(Self {
            property_keys: file.property_keys,
            sentinels,
            numeric,
            names,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, CountryTableError> {
        let contents = fs::read_to_string(path).map_err(|source| CountryTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn numeric_len(&self) -> usize {
        self.numeric.len()
    }

    /// Code for a numeric id such as `"32"` or `"032"`.
    pub fn code_for_numeric(&self, id: &str) -> Option<&str> {
        pad_numeric(id).and_then(|key| self.numeric.get(&key).map(String::as_str))
    }

    /// Code for a country name or common alias, case-insensitive.
    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        self.names
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// First valid, non-sentinel code among the configured property keys.
    pub fn code_from_properties(&self, properties: &FeatureProperties) -> Option<String> {
        self.property_keys
            .iter()
            .filter_map(|key| properties.extra_str(key))
            .map(str::trim)
            .find(|value| is_alpha3(value) && !self.is_sentinel(value))
            .map(str::to_ascii_uppercase)
    }

    pub fn is_sentinel(&self, value: &str) -> bool {
        self.sentinels.contains(&value.trim().to_ascii_uppercase())
    }

    /// Resolve a shape's country: embedded property, then the numeric table,
    /// then the padded numeric id itself.
    pub fn resolve(
        &self,
        numeric_id: Option<&str>,
        properties: Option<&FeatureProperties>,
    ) -> CountryResolution {
        if let Some(code) = properties.and_then(|p| self.code_from_properties(p)) {
            return CountryResolution::new(code, ResolutionMethod::Property);
        }
        let Some(padded) = numeric_id.and_then(pad_numeric) else {
            return CountryResolution::new(String::new(), ResolutionMethod::Unresolved);
        };
        match self.numeric.get(&padded) {
            Some(code) => CountryResolution::new(code.clone(), ResolutionMethod::NumericTable),
            None => CountryResolution::new(padded, ResolutionMethod::RawNumeric),
        }
    }
}

fn is_alpha3(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Zero-pad an all-digit id to three characters.
fn pad_numeric(id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{id:0>3}"))
}

#[derive(Debug, Error)]
pub enum CountryTableError {
    #[error("failed to parse country table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read country table from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("country table numeric id '{0}' is not all digits")]
    InvalidNumericId(String),
    #[error("country table entry '{key}' maps to '{code}', which is not a three-letter code")]
    InvalidCode { key: String, code: String },
}

pub fn load_country_table_from_env() -> (Arc<CountryCodeTable>, ConfigMetadata) {
    load_with_override(
        "country_table",
        "COUNTRY_TABLE_PATH",
        "country_codes.json",
        CountryCodeTable::from_file,
        CountryCodeTable::builtin,
    )
}
