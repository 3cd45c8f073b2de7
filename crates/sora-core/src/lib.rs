pub mod boundary;
pub mod classifier;
pub mod crs;
pub mod engine;
pub mod models;
pub mod raster;
pub mod spatial;

pub use boundary::BoundaryError;
pub use classifier::{classify, LOWER_THRESHOLD_M, UPPER_THRESHOLD_M, URBAN_GRC_MIN};
pub use crs::{CrsError, CrsTransformer, ProjectionError};
pub use engine::{EngineConfig, RiskAssessment, RiskEngine, ZoneConfig};
pub use models::{
    ArcLabel, Classification, ControlledZone, GeoPoint, GroundRisk, ZoneContainment,
};
pub use raster::{Affine, GrcRaster, RasterError};
pub use spatial::{haversine_distance, point_in_any, point_in_polygon};
