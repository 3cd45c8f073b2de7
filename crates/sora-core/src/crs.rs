//! Reprojection from WGS84 geographic coordinates into raster CRSs.
//!
//! The transformer is resolved once from the raster's EPSG code at load time
//! and reused for every lookup. Supported targets are plain geographic
//! degrees (EPSG:4326), spherical web Mercator (EPSG:3857), and the WGS84
//! UTM zones (EPSG:326xx/327xx) via the standard transverse Mercator series.

use thiserror::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Web Mercator is undefined at the poles; this is the conventional cutoff.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Load-time failure: the raster declares a CRS this engine cannot project
/// into.
#[derive(Debug, Error)]
#[error("unsupported raster CRS: EPSG:{0}")]
pub struct CrsError(pub u16);

/// Per-point reprojection failure. Non-fatal; the raster engine converts it
/// into a `GroundRisk::Unknown`.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("latitude {0}° outside projection domain")]
    OutOfDomain(f64),
    #[error("projected coordinate is not finite")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsTransformer {
    /// EPSG:4326, raster indexed directly in degrees.
    Geographic,
    /// EPSG:3857 spherical web Mercator.
    WebMercator,
    /// WGS84 UTM zone (EPSG:326xx north, 327xx south).
    Utm { zone: u8, south: bool },
}

impl CrsTransformer {
    pub fn from_epsg(code: u16) -> Result<Self, CrsError> {
        match code {
            4326 => Ok(Self::Geographic),
            3857 => Ok(Self::WebMercator),
            32601..=32660 => Ok(Self::Utm {
                zone: (code - 32600) as u8,
                south: false,
            }),
            32701..=32760 => Ok(Self::Utm {
                zone: (code - 32700) as u8,
                south: true,
            }),
            other => Err(CrsError(other)),
        }
    }

    /// Project geographic (lon, lat) degrees into this CRS's (x, y).
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        let (x, y) = match *self {
            CrsTransformer::Geographic => (lon, lat),
            CrsTransformer::WebMercator => {
                if lat.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(ProjectionError::OutOfDomain(lat));
                }
                let x = WGS84_A * lon.to_radians();
                let y = WGS84_A * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                    .tan()
                    .ln();
                (x, y)
            }
            CrsTransformer::Utm { zone, south } => {
                // Transverse Mercator breaks down near the poles.
                if lat.abs() > 84.5 {
                    return Err(ProjectionError::OutOfDomain(lat));
                }
                let lon0 = utm_central_meridian_deg(zone);
                let (x, mut y) = transverse_mercator(lon.to_radians(), lat.to_radians(), lon0);
                if south {
                    y += UTM_FALSE_NORTHING_SOUTH;
                }
                (x, y)
            }
        };
        if x.is_finite() && y.is_finite() {
            Ok((x, y))
        } else {
            Err(ProjectionError::NonFinite)
        }
    }
}

fn utm_central_meridian_deg(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// WGS84 transverse Mercator forward projection (Snyder's series), with the
/// UTM scale factor and false easting applied.
fn transverse_mercator(lon_rad: f64, lat_rad: f64, lon0_deg: f64) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let tan_lat = lat_rad.tan();

    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = (lon_rad - lon0_deg.to_radians()) * cos_lat;
    let m = meridian_arc(lat_rad, e2);

    let x = UTM_K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + UTM_FALSE_EASTING;
    let y = UTM_K0
        * (m + n
            * tan_lat
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    (x, y)
}

/// Meridian arc length from the equator to `lat_rad`.
fn meridian_arc(lat_rad: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin())
}
