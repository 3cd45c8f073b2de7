//! Pre-defined flight scenarios for exercising the risk engine.

use super::paths::{CircularPath, LinearPath};
use super::FlightPath;
use sora_core::spatial::offset_by_bearing;

/// A named scenario: one simulated aircraft and its flight path.
pub struct Scenario {
    pub name: String,
    pub path: Box<dyn FlightPath>,
}

impl Scenario {
    /// Look up a scenario by name, centered on the given position.
    /// Names: `orbit`, `zone-transit`, `band-sweep`.
    pub fn by_name(name: &str, center_lat: f64, center_lon: f64, altitude_m: f64) -> Option<Self> {
        match name {
            "orbit" => Some(orbit(center_lat, center_lon, altitude_m)),
            "zone-transit" => Some(zone_transit(center_lat, center_lon)),
            "band-sweep" => Some(band_sweep(center_lat, center_lon)),
            _ => None,
        }
    }
}

/// Circular loiter around the center at a fixed altitude. Centered on a
/// controlled zone this holds the zone branch; centered elsewhere it holds
/// the low-altitude branch.
pub fn orbit(center_lat: f64, center_lon: f64, altitude_m: f64) -> Scenario {
    Scenario {
        name: "orbit".to_string(),
        path: Box::new(CircularPath::new(
            center_lat, center_lon, 800.0, altitude_m, 15.0, 0.0, false,
        )),
    }
}

/// West-to-east level transit through the center at 80 m, entering and
/// leaving whatever zone sits there.
pub fn zone_transit(center_lat: f64, center_lon: f64) -> Scenario {
    let offset_m = 3_000.0;
    let (start_lat, start_lon) =
        offset_by_bearing(center_lat, center_lon, offset_m, 270.0_f64.to_radians());
    let (end_lat, end_lon) =
        offset_by_bearing(center_lat, center_lon, offset_m, 90.0_f64.to_radians());

    Scenario {
        name: "zone-transit".to_string(),
        path: Box::new(LinearPath::level(
            start_lat, start_lon, end_lat, end_lon, 80.0, 25.0,
        )),
    }
}

/// Northbound climb from 50 m to 1200 m, crossing the 500 ft band edge
/// mid-leg.
pub fn band_sweep(center_lat: f64, center_lon: f64) -> Scenario {
    let offset_m = 3_000.0;
    let (start_lat, start_lon) =
        offset_by_bearing(center_lat, center_lon, offset_m, 180.0_f64.to_radians());
    let (end_lat, end_lon) =
        offset_by_bearing(center_lat, center_lon, offset_m, 0.0_f64.to_radians());

    Scenario {
        name: "band-sweep".to_string(),
        path: Box::new(LinearPath::new(
            start_lat, start_lon, end_lat, end_lon, 50.0, 1200.0, 30.0,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sora_core::LOWER_THRESHOLD_M;

    #[test]
    fn by_name_resolves_known_scenarios() {
        for name in ["orbit", "zone-transit", "band-sweep"] {
            let scenario = Scenario::by_name(name, -6.25, 106.85, 80.0).unwrap();
            assert_eq!(scenario.name, name);
        }
        assert!(Scenario::by_name("nope", -6.25, 106.85, 80.0).is_none());
    }

    #[test]
    fn band_sweep_crosses_the_lower_threshold() {
        let scenario = band_sweep(-6.25, 106.85);
        let start = scenario.path.get_position(0.0);
        let end = scenario.path.get_position(1e6);
        assert!(start.altitude_m < LOWER_THRESHOLD_M);
        assert!(end.altitude_m > LOWER_THRESHOLD_M);
    }

    #[test]
    fn zone_transit_passes_through_the_center() {
        let scenario = zone_transit(-6.25, 106.85);
        let mut best = f64::MAX;
        for i in 0..=200 {
            let t = i as f64 * 1.5;
            let p = scenario.path.get_position(t);
            let d = sora_core::haversine_distance(p.lat, p.lon, -6.25, 106.85);
            best = best.min(d);
        }
        assert!(best < 50.0, "closest approach {best} m");
    }
}
