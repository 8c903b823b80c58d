//! Buffered multi-resolution band stack
//!
//! Bands from the 10 m, 20 m and 60 m groups are materialized at one working
//! resolution. Each band keeps its own validity and saturation masks on the
//! working grid; the stack-level validity mask is the AND of all of them.
//!
//! Loading a band that is already buffered replaces it in place, keeping its
//! original position in the load order.

use crate::config::{StackConfig, SATURATION_VALUE};
use crate::core::calibration::CalibrationCoefficients;
use crate::core::catalog::BandCatalog;
use crate::core::index;
use crate::core::reader::{ResampledBand, ResolutionReader};
use crate::io::raster::{RasterSource, StackSources};
use crate::types::{
    BandCube, BandImage, FireError, FireResult, GeoTransform, LogicalBand, Mask, RasterMeta,
};
use ndarray::{Axis, Zip};

/// One buffered band on the working grid
#[derive(Debug, Clone)]
pub struct BandBuffer {
    pub data: BandImage,
    pub mask: Mask,
    pub saturated: Mask,
    pub meta: RasterMeta,
}

impl BandBuffer {
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// In-memory stack of co-registered bands
#[derive(Debug, Clone, Default)]
pub struct BufferedStack {
    bands: Vec<(LogicalBand, BandBuffer)>,
}

impl BufferedStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn contains(&self, band: LogicalBand) -> bool {
        self.position(band).is_some()
    }

    /// Loaded bands in load order
    pub fn bands(&self) -> Vec<LogicalBand> {
        self.bands.iter().map(|(band, _)| *band).collect()
    }

    pub fn buffer(&self, band: LogicalBand) -> Option<&BandBuffer> {
        self.position(band).map(|i| &self.bands[i].1)
    }

    /// Common (rows, cols) of the loaded bands
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.bands.first().map(|(_, buffer)| buffer.shape())
    }

    /// Geotransform of the first band loaded
    pub fn transform(&self) -> Option<GeoTransform> {
        self.bands.first().map(|(_, buffer)| buffer.meta.transform)
    }

    pub fn meta(&self, band: LogicalBand) -> Option<&RasterMeta> {
        self.buffer(band).map(|buffer| &buffer.meta)
    }

    fn position(&self, band: LogicalBand) -> Option<usize> {
        self.bands.iter().position(|(b, _)| *b == band)
    }

    /// Load `band` at `working_resolution` metres with nearest-neighbour resampling
    pub fn load<S: RasterSource>(
        &mut self,
        band: LogicalBand,
        working_resolution: f64,
        reader: &ResolutionReader<S>,
    ) -> FireResult<()> {
        let config = StackConfig::default().with_working_resolution(working_resolution);
        self.load_with(band, &config, reader)
    }

    /// Load `band` through `reader` following `config`
    ///
    /// A band at its native resolution is read directly; any other band is
    /// read onto the scaled grid together with its mask. The saturation mask
    /// is taken from the digital numbers on the same grid.
    pub fn load_with<S: RasterSource>(
        &mut self,
        band: LogicalBand,
        config: &StackConfig,
        reader: &ResolutionReader<S>,
    ) -> FireResult<()> {
        let scale = BandCatalog::scale_factor(band, config.working_resolution)?;
        let native = reader.meta();

        let (raw, meta) = if scale == 1.0 {
            let raw = ResampledBand {
                data: reader.read(band)?,
                mask: reader.read_mask(band)?,
            };
            (raw, native)
        } else {
            let out_shape = reader.scaled_shape(scale);
            let raw = reader.read_resampled_raw(band, out_shape, config.resampling)?;
            let meta = RasterMeta {
                transform: native.transform.rescaled(scale),
                width: out_shape.1,
                height: out_shape.0,
                crs: native.crs,
            };
            (raw, meta)
        };

        let saturated = index::saturated(&raw.data, SATURATION_VALUE);
        let data = if config.raw {
            raw.data
        } else {
            reader.to_reflectance(raw.data)
        };

        log::debug!(
            "Loaded {} from {} group: scale {:.3}, shape {:?}",
            band,
            reader.group(),
            scale,
            data.dim()
        );

        self.insert(
            band,
            BandBuffer {
                data,
                mask: raw.mask,
                saturated,
                meta,
            },
        )
    }

    fn insert(&mut self, band: LogicalBand, buffer: BandBuffer) -> FireResult<()> {
        self.check_shape(band, buffer.shape())?;

        match self.position(band) {
            Some(i) => {
                log::debug!("Replacing buffered band {}", band);
                self.bands[i].1 = buffer;
            }
            None => self.bands.push((band, buffer)),
        }
        Ok(())
    }

    /// Every other buffered band must already share `shape`
    fn check_shape(&self, band: LogicalBand, shape: (usize, usize)) -> FireResult<()> {
        let other = self
            .bands
            .iter()
            .find(|(b, buffer)| *b != band && buffer.shape() != shape);

        if let Some((b, buffer)) = other {
            log::debug!("{} {:?} does not match buffered {} {:?}", band, shape, b, buffer.shape());
            return Err(FireError::ShapeMismatch {
                band: band.to_string(),
                expected: buffer.shape(),
                actual: shape,
            });
        }
        Ok(())
    }

    /// Buffered values of one band, `None` when it was never loaded
    pub fn read(&self, band: LogicalBand) -> Option<&BandImage> {
        self.buffer(band).map(|buffer| &buffer.data)
    }

    /// All buffered bands stacked along a trailing channel axis, in load order
    pub fn read_stacked(&self) -> Option<BandCube> {
        if self.bands.is_empty() {
            return None;
        }
        let views: Vec<_> = self.bands.iter().map(|(_, buffer)| buffer.data.view()).collect();
        ndarray::stack(Axis(2), &views).ok()
    }

    pub fn band_mask(&self, band: LogicalBand) -> Option<&Mask> {
        self.buffer(band).map(|buffer| &buffer.mask)
    }

    /// Validity mask of one band, or the AND across every buffered band
    pub fn read_validity_mask(&self, band: Option<LogicalBand>) -> FireResult<Mask> {
        if let Some(band) = band {
            return self
                .band_mask(band)
                .cloned()
                .ok_or_else(|| FireError::MissingInput(format!("band {} is not loaded", band)));
        }

        let mut bands = self.bands.iter();
        let (_, first) = bands.next().ok_or_else(|| {
            FireError::MissingInput("validity mask of an empty stack".to_string())
        })?;

        let mut mask = first.mask.clone();
        for (_, buffer) in bands {
            Zip::from(&mut mask)
                .and(&buffer.mask)
                .for_each(|m, &valid| *m = *m && valid);
        }
        Ok(mask)
    }

    /// Pixels saturated in `band` on the working grid
    pub fn saturated_mask(&self, band: LogicalBand) -> FireResult<&Mask> {
        self.buffer(band)
            .map(|buffer| &buffer.saturated)
            .ok_or_else(|| FireError::MissingInput(format!("band {} is not loaded", band)))
    }

    /// Zero every buffered pixel that is invalid in any band
    pub fn apply_validity_mask(&mut self) -> FireResult<()> {
        if self.bands.is_empty() {
            return Ok(());
        }

        let mask = self.read_validity_mask(None)?;
        for (_, buffer) in self.bands.iter_mut() {
            Zip::from(&mut buffer.data).and(&mask).for_each(|v, &valid| {
                if !valid {
                    *v = 0.0;
                }
            });
        }

        log::debug!(
            "Applied validity mask: {} of {} pixels invalid",
            mask.len() - index::count(&mask),
            mask.len()
        );
        Ok(())
    }

    /// Replace the values of a buffered band, keeping its masks
    pub fn set_band(&mut self, band: LogicalBand, data: BandImage) -> FireResult<()> {
        let i = self
            .position(band)
            .ok_or_else(|| FireError::MissingInput(format!("band {} is not loaded", band)))?;

        let expected = self.bands[i].1.shape();
        if data.dim() != expected {
            return Err(FireError::ShapeMismatch {
                band: band.to_string(),
                expected,
                actual: data.dim(),
            });
        }

        self.bands[i].1.data = data;
        Ok(())
    }

    /// Map coordinates of the centre pixel `(height / 2, width / 2)`
    pub fn center_coordinate(&self, band: Option<LogicalBand>) -> FireResult<(f64, f64)> {
        let meta = match band {
            Some(band) => self.meta(band),
            None => self.bands.first().map(|(_, buffer)| &buffer.meta),
        }
        .ok_or_else(|| FireError::MissingInput("no band loaded for centre coordinate".to_string()))?;

        Ok(meta.transform.pixel_center(meta.height / 2, meta.width / 2))
    }

    /// Copy of the stack with every band converted to radiance
    pub fn to_radiance(&self, coefficients: &CalibrationCoefficients) -> FireResult<BufferedStack> {
        let mut radiance = self.clone();
        for (band, buffer) in radiance.bands.iter_mut() {
            buffer.data = coefficients.radiance(*band, &buffer.data)?;
        }
        Ok(radiance)
    }
}

/// Assemble a stack from the per-group rasters of one scene
///
/// Each band opens its group's raster independently, so bands from all three
/// resolution groups can be combined.
pub fn load_buffered_stack<P: StackSources>(
    sources: &P,
    bands: &[LogicalBand],
    config: &StackConfig,
) -> FireResult<BufferedStack> {
    config.validate()?;
    log::info!(
        "Loading {} bands at {} m working resolution",
        bands.len(),
        config.working_resolution
    );

    let mut stack = BufferedStack::new();
    for &band in bands {
        let group = BandCatalog::resolve(band).group;
        let source = sources.open(group)?;
        let reader = ResolutionReader::new(source, group)
            .with_quantification(config.quantification_value)?;
        stack.load_with(band, config, &reader)?;
    }

    if config.apply_validity_mask {
        stack.apply_validity_mask()?;
    }

    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::raster::InMemoryRaster;
    use crate::types::ResolutionGroup;
    use ndarray::{array, Array2};

    fn reader_20m(b11: Array2<f32>, b12: Array2<f32>) -> ResolutionReader<InMemoryRaster> {
        let shape = b12.dim();
        let mut bands: Vec<Array2<f32>> = (0..4).map(|_| Array2::from_elem(shape, 1000.0)).collect();
        bands.push(b11);
        bands.push(b12);
        let raster = InMemoryRaster::new(GeoTransform::north_up(100.0, 200.0, 20.0), bands)
            .unwrap()
            .with_nodata(0.0);
        ResolutionReader::new(raster, ResolutionGroup::R20m)
    }

    #[test]
    fn test_read_unloaded_band_is_none() {
        let stack = BufferedStack::new();
        assert!(stack.read(LogicalBand::B12).is_none());
        assert!(stack.read_stacked().is_none());
        assert!(matches!(
            stack.read_validity_mask(None),
            Err(FireError::MissingInput(_))
        ));
    }

    #[test]
    fn test_validity_mask_is_and_of_bands() {
        let reader = reader_20m(
            array![[0.0, 1.0], [1.0, 1.0]],
            array![[1.0, 1.0], [1.0, 0.0]],
        );
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B11, 20.0, &reader).unwrap();
        stack.load(LogicalBand::B12, 20.0, &reader).unwrap();

        assert_eq!(
            stack.read_validity_mask(Some(LogicalBand::B11)).unwrap(),
            array![[false, true], [true, true]]
        );
        assert_eq!(
            stack.read_validity_mask(None).unwrap(),
            array![[false, true], [true, false]]
        );
    }

    #[test]
    fn test_apply_validity_mask_zeroes_invalid() {
        let reader = reader_20m(
            array![[0.0, 5000.0], [5000.0, 5000.0]],
            array![[6000.0, 6000.0], [6000.0, 6000.0]],
        );
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B11, 20.0, &reader).unwrap();
        stack.load(LogicalBand::B12, 20.0, &reader).unwrap();
        stack.apply_validity_mask().unwrap();

        let b12 = stack.read(LogicalBand::B12).unwrap();
        assert_eq!(b12[[0, 0]], 0.0);
        assert!((b12[[1, 1]] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_stacked_read_trailing_axis() {
        let reader = reader_20m(Array2::from_elem((3, 2), 1000.0), Array2::from_elem((3, 2), 2000.0));
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B12, 20.0, &reader).unwrap();
        stack.load(LogicalBand::B11, 20.0, &reader).unwrap();

        let cube = stack.read_stacked().unwrap();
        assert_eq!(cube.dim(), (3, 2, 2));
        assert!((cube[[0, 0, 0]] - 0.2).abs() < 1e-6);
        assert!((cube[[0, 0, 1]] - 0.1).abs() < 1e-6);
        assert_eq!(stack.bands(), vec![LogicalBand::B12, LogicalBand::B11]);
    }

    #[test]
    fn test_saturation_recorded_on_load() {
        let reader = reader_20m(
            Array2::from_elem((2, 2), 1000.0),
            array![[65535.0, 100.0], [100.0, 100.0]],
        );
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B12, 10.0, &reader).unwrap();

        let saturated = stack.saturated_mask(LogicalBand::B12).unwrap();
        assert_eq!(saturated.dim(), (4, 4));
        assert_eq!(index::count(saturated), 4);
        assert!(saturated[[1, 1]] && !saturated[[2, 2]]);
    }

    #[test]
    fn test_resampled_band_metadata() {
        let reader = reader_20m(Array2::from_elem((4, 6), 1.0), Array2::from_elem((4, 6), 1.0));
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B12, 40.0, &reader).unwrap();

        let meta = stack.meta(LogicalBand::B12).unwrap();
        assert_eq!(meta.shape(), (2, 3));
        assert!((meta.transform.pixel_width - 40.0).abs() < 1e-9);
        assert_eq!(stack.transform().unwrap().top_left_x, 100.0);
    }

    #[test]
    fn test_set_band_checks_shape() {
        let reader = reader_20m(Array2::from_elem((2, 2), 1.0), Array2::from_elem((2, 2), 1.0));
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B12, 20.0, &reader).unwrap();

        assert!(stack.set_band(LogicalBand::B12, Array2::zeros((2, 2))).is_ok());
        assert!(matches!(
            stack.set_band(LogicalBand::B12, Array2::zeros((3, 2))),
            Err(FireError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            stack.set_band(LogicalBand::B11, Array2::zeros((2, 2))),
            Err(FireError::MissingInput(_))
        ));
    }

    #[test]
    fn test_center_coordinate() {
        let reader = reader_20m(Array2::from_elem((4, 4), 1.0), Array2::from_elem((4, 4), 1.0));
        let mut stack = BufferedStack::new();
        stack.load(LogicalBand::B12, 20.0, &reader).unwrap();

        let (x, y) = stack.center_coordinate(None).unwrap();
        assert!((x - 150.0).abs() < 1e-9);
        assert!((y - 150.0).abs() < 1e-9);
        assert!(BufferedStack::new().center_coordinate(None).is_err());
    }
}
