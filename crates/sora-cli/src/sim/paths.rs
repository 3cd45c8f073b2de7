//! Flight path implementations.

use sora_core::spatial::{haversine_distance, meters_to_lat, meters_to_lon};
use sora_core::GeoPoint;
use std::f64::consts::PI;

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Get the position at time t seconds from start.
    fn get_position(&self, t: f64) -> GeoPoint;

    /// Get approximate heading at time t (degrees, 0 = North).
    fn get_heading(&self, t: f64) -> f64 {
        // Default: estimate heading from position delta
        let dt = 0.1;
        let p1 = self.get_position(t);
        let p2 = self.get_position(t + dt);

        let dlat = p2.lat - p1.lat;
        let dlon = p2.lon - p1.lon;

        if dlat.abs() < 1e-10 && dlon.abs() < 1e-10 {
            return 0.0;
        }

        let heading_deg = dlon.atan2(dlat).to_degrees();

        // Normalize to 0-360
        if heading_deg < 0.0 {
            heading_deg + 360.0
        } else {
            heading_deg
        }
    }

    /// Get speed in meters per second.
    fn get_speed_mps(&self) -> f64;
}

/// Circular flight path around a center point at a fixed altitude.
pub struct CircularPath {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub start_angle: f64,
    pub clockwise: bool,
    period: f64,
}

impl CircularPath {
    /// Create a new circular flight path.
    ///
    /// # Arguments
    /// * `center_lat` - Center latitude
    /// * `center_lon` - Center longitude
    /// * `radius_m` - Radius in meters
    /// * `altitude_m` - Flight altitude
    /// * `speed_mps` - Speed in m/s
    /// * `start_angle` - Starting angle in radians
    /// * `clockwise` - Direction of flight
    pub fn new(
        center_lat: f64,
        center_lon: f64,
        radius_m: f64,
        altitude_m: f64,
        speed_mps: f64,
        start_angle: f64,
        clockwise: bool,
    ) -> Self {
        let circumference = 2.0 * PI * radius_m;
        let period = circumference / speed_mps;

        Self {
            center_lat,
            center_lon,
            radius_m,
            altitude_m,
            speed_mps,
            start_angle,
            clockwise,
            period,
        }
    }
}

impl FlightPath for CircularPath {
    fn get_position(&self, t: f64) -> GeoPoint {
        let mut angle_rad = self.start_angle + (2.0 * PI * t / self.period);
        if self.clockwise {
            angle_rad = -angle_rad;
        }

        let lat_offset = meters_to_lat(self.radius_m * angle_rad.cos(), self.center_lat);
        let lon_offset = meters_to_lon(self.radius_m * angle_rad.sin(), self.center_lat);

        GeoPoint::new(
            self.center_lat + lat_offset,
            self.center_lon + lon_offset,
            self.altitude_m,
        )
    }

    fn get_speed_mps(&self) -> f64 {
        self.speed_mps
    }
}

/// Linear flight path between two points, with a linear altitude ramp so a
/// single leg can sweep across the classifier's band edges.
pub struct LinearPath {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub start_altitude_m: f64,
    pub end_altitude_m: f64,
    pub speed_mps: f64,
    pub distance_m: f64,
    pub duration: f64,
    heading: f64,
}

impl LinearPath {
    /// Create a new linear flight path.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_lat: f64,
        start_lon: f64,
        end_lat: f64,
        end_lon: f64,
        start_altitude_m: f64,
        end_altitude_m: f64,
        speed_mps: f64,
    ) -> Self {
        let distance_m = haversine_distance(start_lat, start_lon, end_lat, end_lon);
        let duration = if speed_mps > 0.0 {
            distance_m / speed_mps
        } else {
            0.0
        };

        // Calculate heading
        let dlat = end_lat - start_lat;
        let dlon = end_lon - start_lon;
        let mut heading = dlon.atan2(dlat).to_degrees();
        if heading < 0.0 {
            heading += 360.0;
        }

        Self {
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            start_altitude_m,
            end_altitude_m,
            speed_mps,
            distance_m,
            duration,
            heading,
        }
    }

    /// Level flight at a single altitude.
    pub fn level(
        start_lat: f64,
        start_lon: f64,
        end_lat: f64,
        end_lon: f64,
        altitude_m: f64,
        speed_mps: f64,
    ) -> Self {
        Self::new(
            start_lat, start_lon, end_lat, end_lon, altitude_m, altitude_m, speed_mps,
        )
    }
}

impl FlightPath for LinearPath {
    fn get_position(&self, t: f64) -> GeoPoint {
        // Clamp progress to [0, 1]
        let progress = if self.duration > 0.0 {
            (t / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let lat = self.start_lat + progress * (self.end_lat - self.start_lat);
        let lon = self.start_lon + progress * (self.end_lon - self.start_lon);
        let alt = self.start_altitude_m + progress * (self.end_altitude_m - self.start_altitude_m);

        GeoPoint::new(lat, lon, alt)
    }

    fn get_heading(&self, _t: f64) -> f64 {
        self.heading
    }

    fn get_speed_mps(&self) -> f64 {
        self.speed_mps
    }
}
