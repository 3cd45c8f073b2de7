//! CSV flight log, one row per telemetry sample.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use sora_core::ArcLabel;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// One logged sample. Field order is the CSV column order.
#[derive(Debug, Serialize)]
pub struct LogRecord<'a> {
    /// Seconds since the start of the run.
    pub t_sec: f64,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    pub hdg_deg: f64,
    pub spd_mps: f64,
    /// Final GRC; empty when the lookup returned Unknown.
    pub grc: Option<u8>,
    pub arc_label: ArcLabel,
    pub arc: u8,
    pub arc_rule: &'a str,
}

/// Append-only CSV log with a timestamped filename under `dir`.
pub struct FlightLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl FlightLog {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let filename = format!("flight_log_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(filename);
        let writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create flight log {}", path.display()))?;
        Ok(Self { writer, path })
    }

    /// Write one row and flush, so an interrupted run keeps its samples.
    pub fn append(&mut self, record: &LogRecord<'_>) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
