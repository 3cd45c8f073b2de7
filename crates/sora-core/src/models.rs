//! Core data models for the risk classification engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position with altitude in meters above the reference surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, altitude_m: f64) -> Self {
        Self {
            lat,
            lon,
            altitude_m,
        }
    }
}

/// Air Risk Class labels, least to most restrictive.
///
/// The rule table only ever produces ARC-b through ARC-d, so those are the
/// only variants carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArcLabel {
    #[serde(rename = "ARC-b")]
    ArcB,
    #[serde(rename = "ARC-c")]
    ArcC,
    #[serde(rename = "ARC-d")]
    ArcD,
}

impl ArcLabel {
    /// Ordered severity tier. Non-decreasing with label restrictiveness.
    pub fn tier(self) -> u8 {
        match self {
            ArcLabel::ArcB => 1,
            ArcLabel::ArcC => 2,
            ArcLabel::ArcD => 3,
        }
    }
}

impl fmt::Display for ArcLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArcLabel::ArcB => "ARC-b",
            ArcLabel::ArcC => "ARC-c",
            ArcLabel::ArcD => "ARC-d",
        };
        f.write_str(s)
    }
}

/// Result of a ground-risk raster lookup.
///
/// `Unknown` is an expected per-sample outcome (out of raster coverage,
/// reprojection failure, raster never loaded), never a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundRisk {
    /// Final GRC after mapping the raw class code through the SORA table.
    Known(u8),
    Unknown { reason: String },
}

impl GroundRisk {
    pub fn unknown(reason: impl Into<String>) -> Self {
        GroundRisk::Unknown {
            reason: reason.into(),
        }
    }

    /// Final GRC value, if the lookup succeeded.
    pub fn value(&self) -> Option<u8> {
        match self {
            GroundRisk::Known(grc) => Some(*grc),
            GroundRisk::Unknown { .. } => None,
        }
    }
}

/// Classification of a single telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: ArcLabel,
    /// Ordered severity tier, same scale as [`ArcLabel::tier`].
    pub tier: u8,
    /// Whether the fired rule places the sample in controlled airspace.
    pub controlled: bool,
    /// Human-readable justification naming the rule branch that fired.
    pub rule: String,
}

/// A named controlled-airspace zone.
///
/// Rings are ordered `[lon, lat]` vertex lists, implicitly closed. The label
/// is the ARC assigned when a sample falls inside this zone.
#[derive(Debug, Clone)]
pub struct ControlledZone {
    pub name: String,
    pub label: ArcLabel,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Containment result for one zone, produced in priority order.
#[derive(Debug, Clone, Copy)]
pub struct ZoneContainment<'a> {
    pub zone: &'a ControlledZone,
    pub inside: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_is_monotonic_with_label_order() {
        let labels = [ArcLabel::ArcB, ArcLabel::ArcC, ArcLabel::ArcD];
        for pair in labels.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].tier() < pair[1].tier());
        }
    }

    #[test]
    fn labels_serialize_as_arc_strings() {
        let json = serde_json::to_string(&ArcLabel::ArcD).unwrap();
        assert_eq!(json, "\"ARC-d\"");
        assert_eq!(ArcLabel::ArcD.to_string(), "ARC-d");
    }

    #[test]
    fn ground_risk_value_accessor() {
        assert_eq!(GroundRisk::Known(6).value(), Some(6));
        assert_eq!(GroundRisk::unknown("out of raster extent").value(), None);
    }
}
