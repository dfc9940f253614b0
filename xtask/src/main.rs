use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use overlay_runtime::{AnalysisInput, FeatureCollection, ScoreTable};
use schemars::schema_for;
use serde_json::Value;

const SCHEMA_DIR: &str = "docs/schemas";
const FIXTURE_GLOB: &str = "integration_tests/tests/fixtures/*.json";

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("export-schema") => export_schema(),
        Some("validate-fixtures") => validate_fixtures(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask export-schema");
    eprintln!("       cargo xtask validate-fixtures");
    eprintln!("       cargo xtask help");
}

#[derive(Clone, Copy)]
enum Contract {
    Analysis,
    Features,
    Scores,
}

impl Contract {
    const ALL: [Contract; 3] = [Contract::Analysis, Contract::Features, Contract::Scores];

    fn file_name(self) -> &'static str {
        match self {
            Contract::Analysis => "analysis_input.schema.json",
            Contract::Features => "feature_collection.schema.json",
            Contract::Scores => "score_table.schema.json",
        }
    }

    fn schema(self) -> Result<Value, serde_json::Error> {
        match self {
            Contract::Analysis => serde_json::to_value(schema_for!(AnalysisInput)),
            Contract::Features => serde_json::to_value(schema_for!(FeatureCollection)),
            Contract::Scores => serde_json::to_value(schema_for!(ScoreTable)),
        }
    }

    /// Contract a fixture is expected to satisfy, judged by its file name.
    fn for_fixture(path: &Path) -> Option<Contract> {
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with("analysis_") {
            Some(Contract::Analysis)
        } else if stem.ends_with("_scores") {
            Some(Contract::Scores)
        } else if stem.starts_with("osm_") || stem.ends_with("_shapes") {
            Some(Contract::Features)
        } else {
            None
        }
    }
}

fn export_schema() -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(SCHEMA_DIR)?;
    for contract in Contract::ALL {
        let path = Path::new(SCHEMA_DIR).join(contract.file_name());
        let schema = contract.schema()?;
        fs::write(&path, serde_json::to_string_pretty(&schema)? + "\n")?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn validate_fixtures() -> Result<(), Box<dyn Error>> {
    let fixtures: Vec<PathBuf> = glob::glob(FIXTURE_GLOB)?.collect::<Result<_, _>>()?;
    if fixtures.is_empty() {
        return Err(format!("no fixtures matched {FIXTURE_GLOB}").into());
    }

    let mut failures = 0usize;
    for path in fixtures {
        let Some(contract) = Contract::for_fixture(&path) else {
            println!("skip  {}", path.display());
            continue;
        };
        let schema = contract.schema()?;
        let compiled = JSONSchema::compile(&schema).map_err(|err| err.to_string())?;
        let instance: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;

        let errors: Vec<String> = match compiled.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| format!("{} at {}", err, err.instance_path))
                .collect(),
        };
        if errors.is_empty() {
            println!("ok    {}", path.display());
        } else {
            failures += 1;
            println!("FAIL  {}", path.display());
            for error in errors {
                println!("      {error}");
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} fixture(s) failed validation").into());
    }
    Ok(())
}
