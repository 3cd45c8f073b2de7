//! Simulated flight paths replacing a live telemetry feed.
//!
//! Provides deterministic paths and named scenarios that sweep the engine's
//! interesting regions: controlled zones, the 500 ft band edge, and plain
//! low-altitude cruise.

mod paths;
mod scenarios;

pub use paths::{CircularPath, FlightPath, LinearPath};
pub use scenarios::Scenario;
