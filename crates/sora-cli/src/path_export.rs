//! KML flight-path export.
//!
//! Accumulates (lon, lat, alt) triplets during a run and serializes a single
//! extruded LineString on shutdown, one file per run.

use anyhow::{Context, Result};
use chrono::Local;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::{Path, PathBuf};

const KML_NS: &str = "http://www.opengis.net/kml/2.2";
// aabbggrr, cyan
const LINE_COLOR: &str = "ffffff00";
const LINE_WIDTH: &str = "4";

#[derive(Debug, Default)]
pub struct PathExport {
    coordinates: Vec<(f64, f64, f64)>,
}

impl PathExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one position sample; altitude in meters.
    pub fn add_point(&mut self, lat: f64, lon: f64, altitude_m: f64) {
        self.coordinates.push((lon, lat, altitude_m));
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Write the accumulated path as a timestamped KML file under `dir`.
    /// Returns the written path, or `None` when no points were recorded.
    pub fn save(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if self.coordinates.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create KML directory {}", dir.display()))?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("flight_path_{timestamp}.kml"));

        let document = self
            .render(&format!("Log {timestamp}"))
            .context("failed to render KML document")?;
        fs::write(&path, document)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(Some(path))
    }

    fn render(&self, name: &str) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut kml = BytesStart::new("kml");
        kml.push_attribute(("xmlns", KML_NS));
        writer.write_event(Event::Start(kml))?;
        writer.write_event(Event::Start(BytesStart::new("Document")))?;
        text_element(&mut writer, "name", name)?;

        writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
        text_element(&mut writer, "name", "Flight Path")?;

        writer.write_event(Event::Start(BytesStart::new("Style")))?;
        writer.write_event(Event::Start(BytesStart::new("LineStyle")))?;
        text_element(&mut writer, "color", LINE_COLOR)?;
        text_element(&mut writer, "width", LINE_WIDTH)?;
        writer.write_event(Event::End(BytesEnd::new("LineStyle")))?;
        writer.write_event(Event::End(BytesEnd::new("Style")))?;

        writer.write_event(Event::Start(BytesStart::new("LineString")))?;
        text_element(&mut writer, "extrude", "1")?;
        text_element(&mut writer, "altitudeMode", "absolute")?;
        let coords = self
            .coordinates
            .iter()
            .map(|(lon, lat, alt)| format!("{lon},{lat},{alt}"))
            .collect::<Vec<_>>()
            .join(" ");
        text_element(&mut writer, "coordinates", &coords)?;
        writer.write_event(Event::End(BytesEnd::new("LineString")))?;

        writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
        writer.write_event(Event::End(BytesEnd::new("Document")))?;
        writer.write_event(Event::End(BytesEnd::new("kml")))?;

        Ok(writer.into_inner())
    }
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_linestring_with_all_points() {
        let mut export = PathExport::new();
        export.add_point(-6.25, 106.85, 80.0);
        export.add_point(-6.26, 106.86, 85.5);

        let xml = String::from_utf8(export.render("Log test").unwrap()).unwrap();
        assert!(xml.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(xml.contains("<altitudeMode>absolute</altitudeMode>"));
        // KML coordinate order is lon,lat,alt.
        assert!(xml.contains("106.85,-6.25,80 106.86,-6.26,85.5"));
        assert!(xml.contains("<extrude>1</extrude>"));
    }

    #[test]
    fn save_skips_empty_paths() {
        let export = PathExport::new();
        let out = export
            .save(&std::env::temp_dir().join("sora-kml-empty"))
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn save_writes_timestamped_file() {
        let dir = std::env::temp_dir().join(format!("sora-kml-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut export = PathExport::new();
        export.add_point(-6.25, 106.85, 80.0);
        let path = export.save(&dir).unwrap().unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("flight_path_"));
        assert!(fs::read_to_string(&path).unwrap().contains("LineString"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
