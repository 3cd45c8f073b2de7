//! Spatial math: polygon containment and geodesy helpers.

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Check whether a point lies inside a polygon ring using even-odd ray
/// casting.
///
/// The ring is an ordered `[lon, lat]` vertex list, treated as implicitly
/// closed (last vertex connects back to the first). For each edge whose
/// latitude span straddles the probe latitude, the edge's longitude at that
/// latitude is compared against the probe longitude, toggling the inside
/// flag. O(vertices).
///
/// A point exactly on an edge may resolve either way depending on rounding;
/// callers must not rely on exact boundary inclusion.
pub fn point_in_polygon(lon: f64, lat: f64, ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    for i in 0..n {
        let [x1, y1] = ring[i];
        let [x2, y2] = ring[(i + 1) % n];

        if (y1 > lat) != (y2 > lat) {
            // The straddle test excludes horizontal edges, but keep the
            // denominator defined so a degenerate ring degrades to a
            // no-toggle instead of dividing by zero.
            let mut dy = y2 - y1;
            if dy == 0.0 {
                dy = 1e-15;
            }
            let x_at_lat = x1 + (x2 - x1) * (lat - y1) / dy;
            if lon < x_at_lat {
                inside = !inside;
            }
        }
    }
    inside
}

/// True iff the point is inside at least one of the rings.
/// Short-circuits on the first containing ring.
pub fn point_in_any(lon: f64, lat: f64, rings: &[Vec<[f64; 2]>]) -> bool {
    rings.iter().any(|ring| point_in_polygon(lon, lat, ring))
}

/// Calculate distance between two points in meters using the Haversine
/// formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lat(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// Convert an east/west offset in meters to degrees longitude.
/// Requires the reference latitude for proper scaling.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lon(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit square around the origin, counterclockwise.
    fn square() -> Vec<[f64; 2]> {
        vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(point_in_polygon(0.0, 0.0, &square()));
        assert!(point_in_polygon(0.9, -0.9, &square()));
    }

    #[test]
    fn far_exterior_point_is_outside() {
        assert!(!point_in_polygon(10.0, 10.0, &square()));
        assert!(!point_in_polygon(-5.0, 0.0, &square()));
        assert!(!point_in_polygon(0.0, 2.0, &square()));
    }

    #[test]
    fn convex_ring_contains_its_centroid() {
        let ring = vec![[106.80, -6.30], [106.90, -6.30], [106.90, -6.20], [106.80, -6.20]];
        let (mut cx, mut cy) = (0.0, 0.0);
        for [x, y] in &ring {
            cx += x;
            cy += y;
        }
        cx /= ring.len() as f64;
        cy /= ring.len() as f64;
        assert!(point_in_polygon(cx, cy, &ring));
    }

    #[test]
    fn containment_invariant_under_cyclic_rotation() {
        let ring = vec![
            [0.0, 0.0],
            [4.0, 1.0],
            [5.0, 4.0],
            [2.0, 6.0],
            [-1.0, 3.0],
        ];
        let probes = [
            (2.0, 3.0),
            (0.5, 0.5),
            (6.0, 6.0),
            (-2.0, -2.0),
            (4.0, 4.0),
            (2.5, 5.0),
        ];
        for shift in 0..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            for &(lon, lat) in &probes {
                assert_eq!(
                    point_in_polygon(lon, lat, &ring),
                    point_in_polygon(lon, lat, &rotated),
                    "rotation {shift} changed containment of ({lon}, {lat})"
                );
            }
        }
    }

    #[test]
    fn degenerate_ring_is_never_inside() {
        let line: Vec<[f64; 2]> = vec![[0.0, 0.0], [1.0, 1.0]];
        assert!(!point_in_polygon(0.5, 0.5, &line));
    }

    #[test]
    fn point_in_any_short_circuits_to_true_on_match() {
        let rings = vec![
            vec![[10.0, 10.0], [11.0, 10.0], [11.0, 11.0], [10.0, 11.0]],
            square(),
        ];
        assert!(point_in_any(0.0, 0.0, &rings));
        assert!(!point_in_any(5.0, 5.0, &rings));
        assert!(!point_in_any(0.0, 0.0, &[]));
    }

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(-6.2664, 106.8917, -6.2664, 106.8917);
        assert!(dist < 0.001);
    }

    #[test]
    fn offset_by_bearing_round_trip_distance() {
        let (lat, lon) = offset_by_bearing(-6.25, 106.85, 1500.0, 45.0_f64.to_radians());
        let dist = haversine_distance(-6.25, 106.85, lat, lon);
        assert!((dist - 1500.0).abs() < 1.0);
    }
}
