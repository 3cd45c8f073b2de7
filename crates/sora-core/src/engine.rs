//! The explicitly owned risk engine.
//!
//! Built once at startup from caller-supplied paths, immutable afterwards,
//! and passed by reference to the sampling loop. A zone whose boundary file
//! fails to load is skipped; a raster that fails to load degrades every
//! ground-risk lookup to `Unknown` for the process lifetime. Neither aborts
//! startup.

use crate::boundary;
use crate::classifier;
use crate::models::{ArcLabel, Classification, ControlledZone, GroundRisk, ZoneContainment};
use crate::raster::GrcRaster;
use crate::spatial;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A controlled zone's boundary source. Zones are listed in priority order;
/// the first containing zone decides the classification.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub path: PathBuf,
}

/// Engine construction parameters. All paths are supplied by the caller;
/// nothing is baked in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Controlled zones in priority order.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    /// Single-band iGRC GeoTIFF. Omit to run without ground-risk data.
    #[serde(default)]
    pub grc_raster: Option<PathBuf>,
    /// Mode-C veil / TMZ indicator for the operating area.
    #[serde(default)]
    pub mode_c_tmz: bool,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// One assessed telemetry sample: the ground risk that fed the decision and
/// the classification itself.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RiskAssessment {
    pub ground_risk: GroundRisk,
    pub classification: Classification,
}

pub struct RiskEngine {
    zones: Vec<ControlledZone>,
    raster: Option<GrcRaster>,
    mode_c_tmz: bool,
}

impl RiskEngine {
    /// Build an engine from config, downgrading on partial load failures.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut zones = Vec::new();
        for (priority, zone) in config.zones.iter().enumerate() {
            match boundary::load_rings(&zone.path) {
                Ok(rings) => {
                    // Rule table: the highest-priority zone rates ARC-d,
                    // every other zone the second-priority ARC-c.
                    let label = if priority == 0 {
                        ArcLabel::ArcD
                    } else {
                        ArcLabel::ArcC
                    };
                    tracing::info!(zone = %zone.name, rings = rings.len(), "zone loaded");
                    zones.push(ControlledZone {
                        name: zone.name.clone(),
                        label,
                        rings,
                    });
                }
                Err(e) => {
                    tracing::warn!(zone = %zone.name, error = %e, "skipping zone, boundary load failed");
                }
            }
        }

        let raster = config.grc_raster.as_deref().and_then(|path| {
            match GrcRaster::load(path) {
                Ok(raster) => Some(raster),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "ground-risk raster unavailable, lookups degrade to Unknown"
                    );
                    None
                }
            }
        });

        Self::new(zones, raster, config.mode_c_tmz)
    }

    /// Build an engine from already-loaded parts. `zones` must be in
    /// priority order.
    pub fn new(zones: Vec<ControlledZone>, raster: Option<GrcRaster>, mode_c_tmz: bool) -> Self {
        Self {
            zones,
            raster,
            mode_c_tmz,
        }
    }

    pub fn zones(&self) -> &[ControlledZone] {
        &self.zones
    }

    pub fn has_ground_risk(&self) -> bool {
        self.raster.is_some()
    }

    /// Ground-risk lookup for a position; `Unknown` when the raster never
    /// loaded or the position falls outside its coverage.
    pub fn ground_risk(&self, lat: f64, lon: f64) -> GroundRisk {
        match &self.raster {
            Some(raster) => raster.lookup(lat, lon),
            None => GroundRisk::unknown("ground-risk raster not loaded"),
        }
    }

    /// Classify one telemetry sample. The sole per-sample entry point;
    /// never fails.
    pub fn assess(&self, lat: f64, lon: f64, altitude_m: f64) -> RiskAssessment {
        let ground_risk = self.ground_risk(lat, lon);
        let hits: Vec<ZoneContainment<'_>> = self
            .zones
            .iter()
            .map(|zone| ZoneContainment {
                zone,
                inside: spatial::point_in_any(lon, lat, &zone.rings),
            })
            .collect();
        let classification = classifier::classify(altitude_m, &hits, &ground_risk, self.mode_c_tmz);
        RiskAssessment {
            ground_risk,
            classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Affine;
    use crate::crs::CrsTransformer;

    fn square_ring(min_lon: f64, min_lat: f64, size: f64) -> Vec<[f64; 2]> {
        vec![
            [min_lon, min_lat],
            [min_lon + size, min_lat],
            [min_lon + size, min_lat + size],
            [min_lon, min_lat + size],
        ]
    }

    fn two_zone_engine(raster: Option<GrcRaster>) -> RiskEngine {
        let zones = vec![
            ControlledZone {
                name: "Alpha ATZ".to_string(),
                label: ArcLabel::ArcD,
                rings: vec![square_ring(106.80, -6.30, 0.10)],
            },
            ControlledZone {
                name: "Bravo CTR".to_string(),
                label: ArcLabel::ArcC,
                // Overlaps Alpha; priority order must decide.
                rings: vec![square_ring(106.70, -6.40, 0.40)],
            },
        ];
        RiskEngine::new(zones, raster, false)
    }

    #[test]
    fn first_priority_zone_wins_on_overlap() {
        let engine = two_zone_engine(None);
        let assessment = engine.assess(-6.25, 106.85, 80.0);
        assert_eq!(assessment.classification.tier, 3);
        assert!(assessment.classification.controlled);
        assert!(assessment.classification.rule.contains("Alpha ATZ"));
    }

    #[test]
    fn second_zone_fires_outside_the_first() {
        let engine = two_zone_engine(None);
        let assessment = engine.assess(-6.35, 106.75, 80.0);
        assert_eq!(assessment.classification.tier, 2);
        assert!(assessment.classification.rule.contains("Bravo CTR"));
    }

    #[test]
    fn missing_raster_degrades_to_unknown_and_still_classifies() {
        let engine = two_zone_engine(None);
        let assessment = engine.assess(-5.0, 105.0, 50.0);
        assert_eq!(
            assessment.ground_risk,
            GroundRisk::unknown("ground-risk raster not loaded")
        );
        // Degraded ground risk falls toward rural, tier 1.
        assert_eq!(assessment.classification.tier, 1);
        assert!(assessment
            .classification
            .rule
            .contains("ground risk unavailable"));
    }

    #[test]
    fn urban_raster_cell_raises_low_altitude_tier() {
        // One-cell urban raster (raw 6 -> final 8) covering (105..106)E,
        // (-6..-5)N in EPSG:4326.
        let raster = GrcRaster::from_parts(
            vec![6],
            1,
            1,
            Affine::north_up(105.0, -5.0, 1.0, 1.0),
            CrsTransformer::Geographic,
        )
        .unwrap();
        let engine = two_zone_engine(Some(raster));
        let assessment = engine.assess(-5.5, 105.5, 50.0);
        assert_eq!(assessment.ground_risk, GroundRisk::Known(8));
        assert_eq!(assessment.classification.tier, 2);
    }

    #[test]
    fn from_config_skips_unreadable_zone_files() {
        let config = EngineConfig {
            zones: vec![ZoneConfig {
                name: "Ghost".to_string(),
                path: PathBuf::from("/nonexistent/ghost.kml"),
            }],
            grc_raster: Some(PathBuf::from("/nonexistent/grc.tif")),
            mode_c_tmz: false,
        };
        let engine = RiskEngine::from_config(&config);
        assert!(engine.zones().is_empty());
        assert!(!engine.has_ground_risk());
        // Still classifies on altitude alone.
        assert_eq!(engine.assess(-6.0, 106.0, 1100.0).classification.tier, 2);
    }

    #[test]
    fn config_parses_from_json() {
        let json = r#"{
            "zones": [{"name": "Alpha", "path": "zones/alpha.kml"}],
            "grc_raster": "data/grc.tif",
            "mode_c_tmz": true
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.zones[0].name, "Alpha");
        assert!(config.mode_c_tmz);
    }
}
