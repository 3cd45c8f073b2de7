//! Boundary polygon store: loads controlled-airspace rings from KML.
//!
//! Only the outer boundary of each `<Polygon>` is read. Coordinates are the
//! KML `lon,lat[,alt]` triplet form; the altitude component is discarded.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("failed to read boundary source: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed boundary document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("boundary source contains no usable rings")]
    Empty,
}

/// Load all outer boundary rings from a KML file.
///
/// Rings with fewer than 3 valid vertices, or with only collinear vertices,
/// are dropped with a warning. Fails only when the document cannot be parsed
/// or no valid ring remains.
pub fn load_rings(path: &Path) -> Result<Vec<Vec<[f64; 2]>>, BoundaryError> {
    let text = fs::read_to_string(path)?;
    parse_rings(&text)
}

/// Parse outer boundary rings from KML text. See [`load_rings`].
pub fn parse_rings(kml: &str) -> Result<Vec<Vec<[f64; 2]>>, BoundaryError> {
    let mut reader = Reader::from_str(kml);
    reader.config_mut().trim_text(true);

    let mut rings: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut in_outer = false;
    let mut in_ring = false;
    let mut in_coords = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"outerBoundaryIs" => in_outer = true,
                b"LinearRing" if in_outer => in_ring = true,
                b"coordinates" if in_ring => in_coords = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"outerBoundaryIs" => in_outer = false,
                b"LinearRing" => in_ring = false,
                b"coordinates" => in_coords = false,
                _ => {}
            },
            Event::Text(t) if in_coords => {
                let ring = parse_ring_text(&t.unescape()?);
                if ring.len() < 3 {
                    tracing::warn!(
                        vertices = ring.len(),
                        "dropping boundary ring with fewer than 3 valid vertices"
                    );
                } else if is_collinear(&ring) {
                    tracing::warn!("dropping degenerate (collinear) boundary ring");
                } else {
                    rings.push(ring);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if rings.is_empty() {
        return Err(BoundaryError::Empty);
    }
    Ok(rings)
}

/// Parse whitespace-separated `lon,lat[,alt]` triplets into `[lon, lat]`
/// vertices. Malformed triplets are skipped.
fn parse_ring_text(text: &str) -> Vec<[f64; 2]> {
    let mut ring = Vec::new();
    for triplet in text.split_whitespace() {
        let mut parts = triplet.split(',');
        let lon = parts.next().and_then(|s| s.parse::<f64>().ok());
        let lat = parts.next().and_then(|s| s.parse::<f64>().ok());
        match (lon, lat) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                ring.push([lon, lat]);
            }
            _ => tracing::warn!(%triplet, "skipping malformed coordinate triplet"),
        }
    }
    ring
}

/// True when every vertex lies on a single line (zero-area ring).
fn is_collinear(ring: &[[f64; 2]]) -> bool {
    let [x0, y0] = ring[0];
    // Direction anchor: first vertex distinct from the origin vertex.
    let Some(&[x1, y1]) = ring[1..]
        .iter()
        .find(|&&[x, y]| (x - x0).abs() > 1e-12 || (y - y0).abs() > 1e-12)
    else {
        return true;
    };
    ring.iter().all(|&[x, y]| {
        let cross = (x1 - x0) * (y - y0) - (y1 - y0) * (x - x0);
        cross.abs() < 1e-12
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::point_in_polygon;

    const SIMPLE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Test ATZ</name>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>
              106.80,-6.30,0 106.90,-6.30,0 106.90,-6.20,0 106.80,-6.20,0 106.80,-6.30,0
            </coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>"#;

    #[test]
    fn parses_outer_ring_and_discards_altitude() {
        let rings = parse_rings(SIMPLE_KML).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0][0], [106.80, -6.30]);
        assert!(point_in_polygon(106.85, -6.25, &rings[0]));
    }

    #[test]
    fn drops_short_ring_keeps_valid_one() {
        let kml = r#"<kml><Document>
          <Polygon><outerBoundaryIs><LinearRing>
            <coordinates>1,1 2,2</coordinates>
          </LinearRing></outerBoundaryIs></Polygon>
          <Polygon><outerBoundaryIs><LinearRing>
            <coordinates>0,0 1,0 1,1 0,1</coordinates>
          </LinearRing></outerBoundaryIs></Polygon>
        </Document></kml>"#;
        let rings = parse_rings(kml).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn collinear_ring_is_rejected() {
        let kml = r#"<kml><Polygon><outerBoundaryIs><LinearRing>
          <coordinates>0,0 1,1 2,2 3,3</coordinates>
        </LinearRing></outerBoundaryIs></Polygon></kml>"#;
        assert!(matches!(parse_rings(kml), Err(BoundaryError::Empty)));
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(matches!(
            parse_rings("<kml><Document/></kml>"),
            Err(BoundaryError::Empty)
        ));
    }

    #[test]
    fn inner_boundaries_are_ignored() {
        let kml = r#"<kml><Polygon>
          <outerBoundaryIs><LinearRing>
            <coordinates>0,0 2,0 2,2 0,2</coordinates>
          </LinearRing></outerBoundaryIs>
          <innerBoundaryIs><LinearRing>
            <coordinates>0.5,0.5 1.5,0.5 1.5,1.5 0.5,1.5</coordinates>
          </LinearRing></innerBoundaryIs>
        </Polygon></kml>"#;
        let rings = parse_rings(kml).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0][1], [2.0, 0.0]);
    }

    #[test]
    fn malformed_triplets_are_skipped() {
        let kml = r#"<kml><Polygon><outerBoundaryIs><LinearRing>
          <coordinates>0,0 not,a,number 1,0 1,1 0,1</coordinates>
        </LinearRing></outerBoundaryIs></Polygon></kml>"#;
        let rings = parse_rings(kml).unwrap();
        assert_eq!(rings[0].len(), 4);
    }
}
