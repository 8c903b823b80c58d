//! Raster access and metadata parsing

pub mod metadata;
pub mod raster;
pub mod resample;

#[cfg(feature = "gdal")]
pub mod gdal_raster;

pub use raster::{InMemoryRaster, InMemoryScene, RasterSource, StackSources};

#[cfg(feature = "gdal")]
pub use gdal_raster::{GdalRaster, StackPaths};
