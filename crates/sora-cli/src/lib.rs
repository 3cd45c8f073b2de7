//! Simulation, logging, and export tools around the risk engine.

pub mod flight_log;
pub mod path_export;
pub mod sim;

use sora_core::ZoneConfig;
use std::path::PathBuf;

/// Parse a `NAME=KML_PATH` zone argument, used by both binaries.
pub fn parse_zone_arg(s: &str) -> Result<ZoneConfig, String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(ZoneConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err("expected NAME=KML_PATH".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_arg_parses_name_and_path() {
        let zone = parse_zone_arg("Halim ATZ=zones/halim.kml").unwrap();
        assert_eq!(zone.name, "Halim ATZ");
        assert_eq!(zone.path, PathBuf::from("zones/halim.kml"));
    }

    #[test]
    fn zone_arg_rejects_missing_parts() {
        assert!(parse_zone_arg("no-equals-sign").is_err());
        assert!(parse_zone_arg("=path.kml").is_err());
        assert!(parse_zone_arg("name=").is_err());
    }
}
