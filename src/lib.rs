//! firestack: Sentinel-2 Active Fire Detection
//!
//! Assembles Sentinel-2 bands stored in 10 m, 20 m and 60 m stack rasters into
//! one buffered, validity-masked stack at a common working resolution, and
//! evaluates published active-fire rules against it.
//!
//! ```no_run
//! use firestack::{get_detector, load_buffered_stack, DetectorParams, LogicalBand, StackConfig};
//! # fn run(scene: &firestack::io::InMemoryScene) -> firestack::FireResult<()> {
//! let bands = [LogicalBand::B8A, LogicalBand::B11, LogicalBand::B12];
//! let stack = load_buffered_stack(scene, &bands, &StackConfig::default())?;
//! let fire = get_detector("Sahm")?.transform(&stack, &DetectorParams::default())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod detectors;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    BandCube, BandImage, FireError, FireResult, GeoTransform, LogicalBand, Mask, RasterMeta,
    Resampling, ResolutionGroup,
};

pub use config::StackConfig;
pub use crate::core::calibration::CalibrationCoefficients;
pub use crate::core::catalog::{BandCatalog, BandLocation};
pub use crate::core::index::{generalized_ratio, normalized_difference};
pub use crate::core::reader::ResolutionReader;
pub use crate::core::stack::{load_buffered_stack, BufferedStack};
pub use detectors::{get_detector, Detector, DetectorParams, DetectorRegistry};
