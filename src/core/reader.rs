//! Per-band reads from one resolution group's raster

use crate::config::{DEFAULT_QUANTIFICATION_VALUE, SATURATION_VALUE};
use crate::core::calibration::CalibrationCoefficients;
use crate::core::catalog::BandCatalog;
use crate::core::index;
use crate::io::raster::RasterSource;
use crate::types::{
    BandImage, FireError, FireResult, LogicalBand, Mask, RasterMeta, Resampling, ResolutionGroup,
};

/// Band samples and validity mask sharing one output grid
#[derive(Debug, Clone)]
pub struct ResampledBand {
    pub data: BandImage,
    pub mask: Mask,
}

/// Reader over the raster that stores one resolution group
pub struct ResolutionReader<S: RasterSource> {
    source: S,
    group: ResolutionGroup,
    quantification_value: f32,
    calibration: Option<CalibrationCoefficients>,
}

impl<S: RasterSource> ResolutionReader<S> {
    pub fn new(source: S, group: ResolutionGroup) -> Self {
        Self {
            source,
            group,
            quantification_value: DEFAULT_QUANTIFICATION_VALUE,
            calibration: None,
        }
    }

    /// Override the reflectance divisor
    pub fn with_quantification(mut self, value: f32) -> FireResult<Self> {
        if !(value.is_finite() && value > 0.0) {
            return Err(FireError::invalid_parameter(
                "quantification_value",
                value,
                "must be a positive number",
            ));
        }
        self.quantification_value = value;
        Ok(self)
    }

    /// Attach calibration coefficients; their quantification value replaces the current one
    pub fn with_calibration(mut self, calibration: CalibrationCoefficients) -> FireResult<Self> {
        self = self.with_quantification(calibration.quantification_value)?;
        self.calibration = Some(calibration);
        Ok(self)
    }

    pub fn group(&self) -> ResolutionGroup {
        self.group
    }

    pub fn quantification_value(&self) -> f32 {
        self.quantification_value
    }

    pub fn calibration(&self) -> Option<&CalibrationCoefficients> {
        self.calibration.as_ref()
    }

    pub fn meta(&self) -> RasterMeta {
        self.source.meta()
    }

    /// Native (rows, cols) of the raster
    pub fn shape(&self) -> (usize, usize) {
        (self.source.height(), self.source.width())
    }

    /// Output grid of a read scaled by `scale`, truncated towards zero
    pub fn scaled_shape(&self, scale: f64) -> (usize, usize) {
        let (rows, cols) = self.shape();
        (
            (rows as f64 * scale) as usize,
            (cols as f64 * scale) as usize,
        )
    }

    fn band_index(&self, band: LogicalBand) -> FireResult<usize> {
        let band_index = BandCatalog::index_in(self.group, band)?;
        if band_index > self.source.band_count() {
            return Err(FireError::UpstreamIo(format!(
                "{} raster has {} bands, {} expected at index {}",
                self.group,
                self.source.band_count(),
                band,
                band_index
            )));
        }
        Ok(band_index)
    }

    /// Native-resolution digital numbers
    pub fn read(&self, band: LogicalBand) -> FireResult<BandImage> {
        self.source.read_band(self.band_index(band)?)
    }

    /// Native-resolution reflectance (`DN / quantification`)
    pub fn read_reflectance(&self, band: LogicalBand) -> FireResult<BandImage> {
        Ok(self.to_reflectance(self.read(band)?))
    }

    /// Native-resolution validity mask
    pub fn read_mask(&self, band: LogicalBand) -> FireResult<Mask> {
        let mask = self.source.read_mask(self.band_index(band)?)?;
        Ok(mask.mapv(|v| v > 0))
    }

    /// Digital numbers and validity mask resampled onto `out_shape` with one interpolation
    pub fn read_resampled_raw(
        &self,
        band: LogicalBand,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<ResampledBand> {
        let band_index = self.band_index(band)?;
        log::debug!(
            "Resampling {} from {:?} to {:?} ({:?})",
            band,
            self.shape(),
            out_shape,
            resampling
        );

        let data = self
            .source
            .read_band_resampled(band_index, out_shape, resampling)?;
        let mask = self
            .source
            .read_mask_resampled(band_index, out_shape, resampling)?
            .mapv(|v| v > 0);

        Ok(ResampledBand { data, mask })
    }

    /// Reflectance and validity mask resampled onto `out_shape`
    pub fn read_resampled(
        &self,
        band: LogicalBand,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<ResampledBand> {
        let raw = self.read_resampled_raw(band, out_shape, resampling)?;
        Ok(ResampledBand {
            data: self.to_reflectance(raw.data),
            mask: raw.mask,
        })
    }

    /// Top-of-atmosphere radiance at `scale` times the native pixel density
    ///
    /// Requires calibration coefficients attached with [`Self::with_calibration`].
    pub fn read_radiance(&self, band: LogicalBand, scale: f64) -> FireResult<BandImage> {
        let calibration = self.calibration.as_ref().ok_or_else(|| {
            FireError::MissingInput(format!(
                "radiance of {} needs calibration coefficients",
                band
            ))
        })?;

        let reflectance = if scale == 1.0 {
            self.read_reflectance(band)?
        } else {
            self.read_resampled(band, self.scaled_shape(scale), Resampling::Nearest)?
                .data
        };

        calibration.radiance(band, &reflectance)
    }

    /// Pixels whose native digital number equals the saturation sentinel
    pub fn saturated_mask(&self, band: LogicalBand) -> FireResult<Mask> {
        Ok(index::saturated(&self.read(band)?, SATURATION_VALUE))
    }

    pub(crate) fn to_reflectance(&self, raw: BandImage) -> BandImage {
        let q = self.quantification_value;
        raw.mapv_into(|v| v / q)
    }
}
