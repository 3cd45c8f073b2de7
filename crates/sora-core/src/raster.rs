//! Ground-risk raster engine backed by a single-band GeoTIFF.
//!
//! The raster holds intrinsic Ground Risk Class (iGRC) codes 0-6. A lookup
//! reprojects the geographic query into the raster's native CRS, applies the
//! inverse affine transform to get a cell index, and maps the raw code
//! through the fixed SORA table to a final GRC. Every per-call failure
//! (outside the mapped extent, reprojection error, unmapped code) becomes a
//! `GroundRisk::Unknown` with a reason; only loading can fail hard.

use crate::crs::{CrsError, CrsTransformer};
use crate::models::GroundRisk;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// Raw iGRC codes cover [0, 6].
const IGRC_MAX: i32 = 6;

/// Fixed iGRC to final-GRC map (SORA table, speed < 35 m/s column).
const FINAL_GRC: [u8; 7] = [1, 3, 4, 5, 6, 7, 8];

// GeoKey IDs from the GeoTIFF spec.
const GEOKEY_PROJECTED_CS_TYPE: u64 = 3072;
const GEOKEY_GEOGRAPHIC_TYPE: u64 = 2048;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to open raster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode raster: {0}")]
    Decode(#[from] tiff::TiffError),
    #[error("raster band has an unsupported sample format")]
    UnsupportedSamples,
    #[error("raster band size does not match its dimensions")]
    BandShape,
    #[error("raster is missing an affine transform (pixel scale/tiepoint or model transformation)")]
    MissingTransform,
    #[error("raster affine transform is singular")]
    SingularTransform,
    #[error("raster does not declare a CRS")]
    MissingCrs,
    #[error(transparent)]
    Crs(#[from] CrsError),
}

/// Affine grid-to-world mapping in GDAL coefficient order:
/// `x = c + a*col + b*row`, `y = f + d*col + e*row`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    /// North-up grid: origin at the top-left corner, square-ish cells,
    /// y decreasing with row.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            a: pixel_width,
            b: 0.0,
            c: origin_x,
            d: 0.0,
            e: -pixel_height,
            f: origin_y,
        }
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.c + self.a * col + self.b * row,
            self.f + self.d * col + self.e * row,
        )
    }

    /// Inverse mapping (world to grid), or `None` when the transform is
    /// singular.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        Some(Affine {
            a: self.e / det,
            b: -self.b / det,
            c: (self.b * self.f - self.e * self.c) / det,
            d: -self.d / det,
            e: self.a / det,
            f: (self.d * self.c - self.a * self.f) / det,
        })
    }
}

/// Immutable single-band classification grid. Constructed once at startup,
/// read-only afterwards; safe to share across threads.
#[derive(Debug, Clone)]
pub struct GrcRaster {
    data: Vec<i32>,
    width: usize,
    height: usize,
    /// World (x, y) to fractional (col, row), prebuilt at load.
    inverse: Affine,
    transformer: CrsTransformer,
}

impl GrcRaster {
    /// Load a single-band GeoTIFF with its affine transform and CRS.
    pub fn load(path: &Path) -> Result<Self, RasterError> {
        let file = BufReader::new(File::open(path)?);
        let mut decoder = Decoder::new(file)?;

        let (width, height) = decoder.dimensions()?;
        let data: Vec<i32> = match decoder.read_image()? {
            DecodingResult::U8(v) => v.into_iter().map(i32::from).collect(),
            DecodingResult::I8(v) => v.into_iter().map(i32::from).collect(),
            DecodingResult::U16(v) => v.into_iter().map(i32::from).collect(),
            DecodingResult::I16(v) => v.into_iter().map(i32::from).collect(),
            DecodingResult::I32(v) => v,
            DecodingResult::U32(v) => v
                .into_iter()
                .map(|c| i32::try_from(c).unwrap_or(i32::MAX))
                .collect(),
            _ => return Err(RasterError::UnsupportedSamples),
        };

        let transform = read_affine(&mut decoder)?;
        let epsg = read_epsg(&mut decoder)?;
        let transformer = CrsTransformer::from_epsg(epsg)?;

        tracing::info!(
            width,
            height,
            epsg,
            "ground-risk raster loaded"
        );
        Self::from_parts(data, width as usize, height as usize, transform, transformer)
    }

    /// Build a raster from already-decoded parts. Used by tests and by
    /// callers with synthetic grids.
    pub fn from_parts(
        data: Vec<i32>,
        width: usize,
        height: usize,
        transform: Affine,
        transformer: CrsTransformer,
    ) -> Result<Self, RasterError> {
        if data.len() != width * height {
            return Err(RasterError::BandShape);
        }
        let inverse = transform.inverse().ok_or(RasterError::SingularTransform)?;
        Ok(Self {
            data,
            width,
            height,
            inverse,
            transformer,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Look up the final GRC for a geographic position.
    ///
    /// Never fails: positions outside the mapped extent, reprojection
    /// failures, and unmapped class codes all return `Unknown` with the
    /// reason recorded.
    pub fn lookup(&self, lat: f64, lon: f64) -> GroundRisk {
        let (x, y) = match self.transformer.forward(lon, lat) {
            Ok(xy) => xy,
            Err(e) => return GroundRisk::unknown(format!("reprojection failed: {e}")),
        };

        let (col, row) = self.inverse.apply(x, y);
        if !col.is_finite() || !row.is_finite() {
            return GroundRisk::unknown("raster index is not finite");
        }

        // Truncate to integer cell indices, then bounds-check.
        let (col, row) = (col.trunc() as i64, row.trunc() as i64);
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return GroundRisk::unknown("out of raster extent");
        }

        let raw = self.data[row as usize * self.width + col as usize];
        if (0..=IGRC_MAX).contains(&raw) {
            GroundRisk::Known(FINAL_GRC[raw as usize])
        } else {
            GroundRisk::unknown(format!("unmapped class code {raw}"))
        }
    }
}

fn read_affine<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<Affine, RasterError> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();
    if let (Some(scale), Some(tie)) = (scale, tiepoint) {
        if scale.len() >= 2 && tie.len() >= 6 && scale[0] != 0.0 && scale[1] != 0.0 {
            // Tiepoint binds grid (i, j) to world (x, y); GeoTIFF pixel
            // scale is positive with y decreasing down the rows.
            let (i, j) = (tie[0], tie[1]);
            let (x, y) = (tie[3], tie[4]);
            return Ok(Affine::north_up(
                x - i * scale[0],
                y + j * scale[1],
                scale[0],
                scale[1],
            ));
        }
    }
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if m.len() >= 16 {
            return Ok(Affine {
                a: m[0],
                b: m[1],
                c: m[3],
                d: m[4],
                e: m[5],
                f: m[7],
            });
        }
    }
    Err(RasterError::MissingTransform)
}

fn read_epsg<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<u16, RasterError> {
    let dir = decoder
        .get_tag_u64_vec(Tag::GeoKeyDirectoryTag)
        .map_err(|_| RasterError::MissingCrs)?;

    // Directory: a 4-value header, then 4-value key entries
    // (KeyID, TIFFTagLocation, Count, ValueOffset).
    let mut projected = None;
    let mut geographic = None;
    for entry in dir.get(4..).unwrap_or_default().chunks_exact(4) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            // Value lives in another tag; EPSG codes are bare SHORTs.
            continue;
        }
        match key {
            GEOKEY_PROJECTED_CS_TYPE => projected = Some(value as u16),
            GEOKEY_GEOGRAPHIC_TYPE => geographic = Some(value as u16),
            _ => {}
        }
    }
    projected.or(geographic).ok_or(RasterError::MissingCrs)
}
