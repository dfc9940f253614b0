use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use core_overlay::{
    build_tactical_overlay, canonicalize_score_keys, load_overlay_config_from_env,
    tag_osm_feature, AnalysisInput, FeatureCollection, GlobeStyler, LatLng, OverlayConfig,
    ScoreMode, ScoreTable, SectorAssembler, SectorConfig,
};
use serde::de::DeserializeOwned;
use tracing::info;

mod app;
mod report;
mod ui;

use app::InspectorApp;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Tactical overlay inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble and print the nine sectors for an analysis payload.
    Sectors {
        /// Analysis JSON as returned by the briefing service.
        #[arg(long)]
        input: PathBuf,
        /// Override the grid cell size in degrees.
        #[arg(long)]
        cell_size: Option<f64>,
        /// Show per-category keyword hits for text-backed sectors.
        #[arg(long)]
        explain: bool,
        #[arg(long)]
        json: bool,
    },
    /// Style country shapes from a per-country score table.
    Globe {
        /// GeoJSON FeatureCollection of country shapes.
        #[arg(long)]
        shapes: PathBuf,
        /// JSON object of country code (or name) to score.
        #[arg(long)]
        scores: PathBuf,
        #[arg(long, default_value = "funding-gap")]
        mode: ScoreMode,
        #[arg(long)]
        json: bool,
    },
    /// Fill category, feature type, name and sector on raw OSM features.
    TagOsm {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long)]
        cell_size: Option<f64>,
    },
    /// Browse the assembled grid interactively.
    View {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Sectors {
            input,
            cell_size,
            explain,
            json,
        } => run_sectors(&batch_config(), &input, cell_size, explain, json),
        Command::Globe {
            shapes,
            scores,
            mode,
            json,
        } => run_globe(&batch_config(), &shapes, &scores, mode, json),
        Command::TagOsm {
            input,
            lat,
            lng,
            cell_size,
        } => run_tag_osm(&batch_config(), &input, LatLng::new(lat, lng), cell_size),
        Command::View { input } => run_view(&input),
    }
}

/// Logs go to stderr so stdout stays clean for reports and JSON.
fn batch_config() -> OverlayConfig {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();
    let (config, _) = load_overlay_config_from_env();
    config
}

fn run_view(input: &Path) -> Result<()> {
    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();
    let (config, _) = load_overlay_config_from_env();
    let analysis: AnalysisInput = read_json(input)?;
    let overlay = build_tactical_overlay(&analysis, &config);
    info!(sectors = overlay.sectors.len(), "Loaded {}", input.display());
    let app = InspectorApp::new(overlay, config.keywords.clone(), log_rx)?;
    app.run()
}

fn run_sectors(
    config: &OverlayConfig,
    input: &Path,
    cell_size: Option<f64>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let analysis: AnalysisInput = read_json(input)?;
    let sectors = with_cell_size(&config.sectors, cell_size);
    let overlay = SectorAssembler::new(&config.keywords, &sectors).assemble(&analysis);
    if json {
        println!("{}", serde_json::to_string_pretty(&overlay)?);
    } else {
        let keywords = explain.then_some(config.keywords.as_ref());
        print!("{}", report::render_sectors(&overlay, keywords));
    }
    Ok(())
}

fn run_globe(
    config: &OverlayConfig,
    shapes: &Path,
    scores: &Path,
    mode: ScoreMode,
    json: bool,
) -> Result<()> {
    let shapes: FeatureCollection = read_json(shapes)?;
    let raw_scores: ScoreTable = read_json(scores)?;
    let scores = canonicalize_score_keys(&raw_scores, &config.countries);
    let styler = GlobeStyler::new(config, &scores, mode);
    let styles = styler.style_collection(&shapes);
    let legend = styler.legend();
    if json {
        let payload = serde_json::json!({ "legend": legend, "countries": styles });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", report::render_globe(&styles, &legend));
    }
    Ok(())
}

fn run_tag_osm(
    config: &OverlayConfig,
    input: &Path,
    focal: LatLng,
    cell_size: Option<f64>,
) -> Result<()> {
    let collection: FeatureCollection = read_json(input)?;
    let cell_size = with_cell_size(&config.sectors, cell_size).cell_size_deg();
    let tagged = FeatureCollection {
        features: collection
            .features
            .iter()
            .map(|feature| tag_osm_feature(feature, focal, cell_size))
            .collect(),
    };
    info!(features = tagged.features.len(), "osm.tagged");
    println!("{}", serde_json::to_string_pretty(&tagged)?);
    Ok(())
}

fn with_cell_size(base: &SectorConfig, cell_size: Option<f64>) -> SectorConfig {
    match cell_size {
        Some(size) => base.clone().with_cell_size(size),
        None => base.clone(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).wrap_err_with(|| format!("parsing {}", path.display()))
}
