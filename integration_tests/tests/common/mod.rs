#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use anyhow::Context;
use serde::de::DeserializeOwned;

static INIT: Once = Once::new();

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture<T: DeserializeOwned>(name: &str) -> anyhow::Result<T> {
    let path = fixture_path(name);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing fixture {}", path.display()))
}

/// Point the keyword table loader at the test fixture.
pub fn ensure_test_config() {
    INIT.call_once(|| {
        let table_path = fixture_path("test_keyword_table.json");

        debug_assert!(
            table_path.exists(),
            "missing test keyword table at {}",
            table_path.display()
        );

        std::env::set_var("KEYWORD_TABLE_PATH", &table_path);
    });
}
