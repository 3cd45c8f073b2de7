//! CLI tool to classify a single position.
//!
//! Runs one assessment through the risk engine and prints it as JSON.

use clap::Parser;
use sora_core::{EngineConfig, RiskEngine, ZoneConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Classify one position and print the assessment as JSON
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Latitude in degrees
    #[arg(long)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long)]
    lon: f64,

    /// Altitude in meters
    #[arg(long, default_value_t = 80.0)]
    altitude: f64,

    /// Engine config file (JSON); overrides --zone/--raster/--mode-c-tmz
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controlled zone as NAME=KML_PATH (repeatable, first is highest priority)
    #[arg(long = "zone", value_parser = sora_cli::parse_zone_arg)]
    zones: Vec<ZoneConfig>,

    /// Ground risk GeoTIFF
    #[arg(long)]
    raster: Option<PathBuf>,

    /// Treat the area as Mode-C veil / TMZ
    #[arg(long)]
    mode_c_tmz: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sora_core=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig {
            zones: args.zones.clone(),
            grc_raster: args.raster.clone(),
            mode_c_tmz: args.mode_c_tmz,
        },
    };
    let engine = RiskEngine::from_config(&config);

    let assessment = engine.assess(args.lat, args.lon, args.altitude);
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}
