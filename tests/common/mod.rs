//! Synthetic Sentinel-2 scenes for integration tests
#![allow(dead_code)]

use firestack::io::{InMemoryRaster, InMemoryScene};
use firestack::{
    load_buffered_stack, BandCatalog, BufferedStack, CalibrationCoefficients, GeoTransform,
    LogicalBand, ResolutionGroup, StackConfig,
};
use ndarray::Array2;

pub const ORIGIN_X: f64 = 600_000.0;
pub const ORIGIN_Y: f64 = 4_200_000.0;

/// Reflectance of bands not set explicitly
pub const BACKGROUND_REFLECTANCE: f32 = 0.1;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scene described on its 20 m grid; 10 m bands are twice as dense, 60 m a third
pub struct SyntheticScene {
    rows: usize,
    cols: usize,
    bands: Vec<(LogicalBand, Array2<f32>)>,
    nodata: bool,
}

impl SyntheticScene {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bands: Vec::new(),
            nodata: false,
        }
    }

    /// Set a band's reflectance on its native grid
    pub fn band(mut self, band: LogicalBand, reflectance: Array2<f32>) -> Self {
        self.bands.retain(|(b, _)| *b != band);
        self.bands.push((band, reflectance));
        self
    }

    /// Set a band to a uniform reflectance
    pub fn uniform(self, band: LogicalBand, reflectance: f32) -> Self {
        let shape = self.native_shape(BandCatalog::resolve(band).group);
        self.band(band, Array2::from_elem(shape, reflectance))
    }

    /// Treat digital number 0 as no-data
    pub fn with_nodata(mut self) -> Self {
        self.nodata = true;
        self
    }

    pub fn native_shape(&self, group: ResolutionGroup) -> (usize, usize) {
        match group {
            ResolutionGroup::R10m => (self.rows * 2, self.cols * 2),
            ResolutionGroup::R20m => (self.rows, self.cols),
            ResolutionGroup::R60m => ((self.rows / 3).max(1), (self.cols / 3).max(1)),
        }
    }

    pub fn raster(&self, group: ResolutionGroup) -> InMemoryRaster {
        let shape = self.native_shape(group);
        let bands = BandCatalog::bands(group)
            .iter()
            .map(|band| {
                let reflectance = self
                    .bands
                    .iter()
                    .find(|(b, _)| b == band)
                    .map(|(_, r)| r.clone())
                    .unwrap_or_else(|| Array2::from_elem(shape, BACKGROUND_REFLECTANCE));
                assert_eq!(reflectance.dim(), shape, "{} must be {:?}", band, shape);
                to_dn(&reflectance)
            })
            .collect();

        let transform = GeoTransform::north_up(ORIGIN_X, ORIGIN_Y, group.meters());
        let raster = InMemoryRaster::new(transform, bands)
            .unwrap()
            .with_crs("EPSG:32636");
        if self.nodata {
            raster.with_nodata(0.0)
        } else {
            raster
        }
    }

    pub fn build(&self) -> InMemoryScene {
        ResolutionGroup::ALL
            .iter()
            .fold(InMemoryScene::new(), |scene, &group| {
                scene.with_group(group, self.raster(group))
            })
    }

    /// Stack of `bands` at 20 m
    pub fn stack(&self, bands: &[LogicalBand]) -> BufferedStack {
        load_buffered_stack(&self.build(), bands, &StackConfig::default()).unwrap()
    }
}

/// Reflectance to L1C digital numbers
pub fn to_dn(reflectance: &Array2<f32>) -> Array2<f32> {
    reflectance.mapv(|r| (r * 10000.0).round())
}

/// Coefficients under which radiance equals reflectance for every band
pub fn unit_calibration() -> CalibrationCoefficients {
    LogicalBand::ALL
        .iter()
        .fold(CalibrationCoefficients::new(10000.0, 1.0), |c, &band| {
            c.with_band(band, std::f64::consts::PI, 0.0)
        })
}

pub fn swir_bands() -> [LogicalBand; 3] {
    [LogicalBand::B8A, LogicalBand::B11, LogicalBand::B12]
}
