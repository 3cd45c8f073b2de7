//! CLI tool to fly a simulated scenario through the risk engine.
//!
//! Samples a flight path at a fixed rate, classifies every position, and
//! writes a CSV flight log plus a KML trace of the flown path.

use clap::Parser;
use rand::Rng;
use sora_cli::flight_log::{FlightLog, LogRecord};
use sora_cli::path_export::PathExport;
use sora_cli::sim::Scenario;
use sora_core::{EngineConfig, RiskEngine, ZoneConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fly a simulated scenario and log the risk classification of every sample
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
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

    /// Scenario name: orbit, zone-transit, band-sweep
    #[arg(long, default_value = "orbit")]
    scenario: String,

    /// Center latitude (default: Halim, Jakarta)
    #[arg(long, default_value_t = -6.2664)]
    lat: f64,

    /// Center longitude (default: Halim, Jakarta)
    #[arg(long, default_value_t = 106.8917)]
    lon: f64,

    /// Altitude in meters (orbit scenario)
    #[arg(long, default_value_t = 80.0)]
    altitude: f64,

    /// Duration in seconds
    #[arg(long, default_value_t = 120)]
    duration: u64,

    /// Update rate in Hz
    #[arg(long, default_value_t = 2.0)]
    rate: f64,

    /// Directory for CSV flight logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Directory for KML path exports
    #[arg(long, default_value = "flight_path")]
    kml_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sora_core=debug".parse()?),
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

    let Some(scenario) = Scenario::by_name(&args.scenario, args.lat, args.lon, args.altitude)
    else {
        anyhow::bail!(
            "unknown scenario '{}', expected orbit, zone-transit, or band-sweep",
            args.scenario
        );
    };

    println!("Flying scenario '{}'", scenario.name);
    println!("  Center: ({}, {})", args.lat, args.lon);
    println!(
        "  Zones: {}, ground risk: {}",
        engine.zones().len(),
        if engine.has_ground_risk() {
            "raster"
        } else {
            "unavailable"
        }
    );
    println!("  Duration: {}s, Update rate: {}Hz", args.duration, args.rate);
    println!();

    let mut log = FlightLog::create(&args.log_dir)?;
    let mut kml = PathExport::new();

    let start = time::Instant::now();
    let mut sample_count = 0u32;
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / args.rate));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted, saving outputs...");
                break;
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > args.duration as f64 {
            break;
        }

        let p = scenario.path.get_position(elapsed);
        let mut rng = rand::rng();
        let heading =
            (scenario.path.get_heading(elapsed) + rng.random_range(-2.0..=2.0)).rem_euclid(360.0);
        let speed = scenario.path.get_speed_mps() * rng.random_range(0.95..=1.05);

        let assessment = engine.assess(p.lat, p.lon, p.altitude_m);
        let classification = &assessment.classification;

        log.append(&LogRecord {
            t_sec: elapsed,
            lat: p.lat,
            lon: p.lon,
            alt_m: p.altitude_m,
            hdg_deg: heading,
            spd_mps: speed,
            grc: assessment.ground_risk.value(),
            arc_label: classification.label,
            arc: classification.tier,
            arc_rule: &classification.rule,
        })?;
        kml.add_point(p.lat, p.lon, p.altitude_m);

        sample_count += 1;
        println!(
            "[{:4}] ({:.6}, {:.6}) {:6.1} m -> {} tier {} | {}",
            sample_count,
            p.lat,
            p.lon,
            p.altitude_m,
            classification.label,
            classification.tier,
            classification.rule
        );
    }

    println!("\nRun complete. Logged {} samples.", sample_count);
    println!("  Flight log: {}", log.path().display());
    match kml.save(&args.kml_dir)? {
        Some(path) => println!("  Flight path: {}", path.display()),
        None => println!("  Flight path: no samples, nothing written"),
    }

    Ok(())
}
