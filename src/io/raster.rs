//! Raster I/O contract consumed by the resolution readers
//!
//! Sources hand back fully materialized arrays. Band indices are 1-based,
//! mask values follow the GDAL convention (0 = invalid, 255 = valid).

use crate::io::resample::resample;
use crate::types::{FireError, FireResult, GeoTransform, RasterMeta, Resampling, ResolutionGroup};
use ndarray::Array2;
use std::collections::HashMap;

/// One opened multi-band raster dataset
pub trait RasterSource {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn band_count(&self) -> usize;

    fn transform(&self) -> GeoTransform;

    fn crs(&self) -> Option<String>;

    /// Native-resolution samples of a 1-based band
    fn read_band(&self, band_index: usize) -> FireResult<Array2<f32>>;

    /// Native-resolution validity mask of a 1-based band
    fn read_mask(&self, band_index: usize) -> FireResult<Array2<u8>>;

    /// Samples resampled onto an `out_shape` (rows, cols) grid over the same footprint
    fn read_band_resampled(
        &self,
        band_index: usize,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<Array2<f32>> {
        resample(&self.read_band(band_index)?, out_shape, resampling)
    }

    /// Mask resampled with the same grid alignment as `read_band_resampled`
    fn read_mask_resampled(
        &self,
        band_index: usize,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<Array2<u8>> {
        resample(&self.read_mask(band_index)?, out_shape, resampling)
    }

    fn meta(&self) -> RasterMeta {
        RasterMeta {
            transform: self.transform(),
            width: self.width(),
            height: self.height(),
            crs: self.crs(),
        }
    }
}

/// Opens the dataset holding one resolution group of a scene
pub trait StackSources {
    type Source: RasterSource;

    fn open(&self, group: ResolutionGroup) -> FireResult<Self::Source>;
}

/// Raster held entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryRaster {
    bands: Vec<Array2<f32>>,
    masks: Vec<Option<Array2<u8>>>,
    nodata: Option<f32>,
    transform: GeoTransform,
    crs: Option<String>,
}

impl InMemoryRaster {
    /// Build a raster from equally shaped bands (band 1 first)
    pub fn new(transform: GeoTransform, bands: Vec<Array2<f32>>) -> FireResult<Self> {
        let first = bands.first().ok_or_else(|| {
            FireError::UpstreamIo("in-memory raster needs at least one band".to_string())
        })?;
        let expected = first.dim();

        for (i, band) in bands.iter().enumerate() {
            if band.dim() != expected {
                return Err(FireError::ShapeMismatch {
                    band: format!("#{}", i + 1),
                    expected,
                    actual: band.dim(),
                });
            }
        }

        let masks = vec![None; bands.len()];
        Ok(Self {
            bands,
            masks,
            nodata: None,
            transform,
            crs: None,
        })
    }

    /// Samples equal to `nodata` are reported invalid by `read_mask`
    pub fn with_nodata(mut self, nodata: f32) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Attach an explicit mask channel to a 1-based band
    pub fn with_mask(mut self, band_index: usize, mask: Array2<u8>) -> FireResult<Self> {
        let slot = self.checked_index(band_index)?;
        let expected = self.bands[slot].dim();
        if mask.dim() != expected {
            return Err(FireError::ShapeMismatch {
                band: format!("#{} mask", band_index),
                expected,
                actual: mask.dim(),
            });
        }
        self.masks[slot] = Some(mask);
        Ok(self)
    }

    fn checked_index(&self, band_index: usize) -> FireResult<usize> {
        if band_index == 0 || band_index > self.bands.len() {
            return Err(FireError::UpstreamIo(format!(
                "band index {} out of range for raster with {} bands",
                band_index,
                self.bands.len()
            )));
        }
        Ok(band_index - 1)
    }
}

impl RasterSource for InMemoryRaster {
    fn width(&self) -> usize {
        self.bands[0].ncols()
    }

    fn height(&self) -> usize {
        self.bands[0].nrows()
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn crs(&self) -> Option<String> {
        self.crs.clone()
    }

    fn read_band(&self, band_index: usize) -> FireResult<Array2<f32>> {
        let slot = self.checked_index(band_index)?;
        Ok(self.bands[slot].clone())
    }

    fn read_mask(&self, band_index: usize) -> FireResult<Array2<u8>> {
        let slot = self.checked_index(band_index)?;

        if let Some(mask) = &self.masks[slot] {
            return Ok(mask.clone());
        }

        let mask = match self.nodata {
            Some(nodata) => self.bands[slot].mapv(|v| if v == nodata { 0 } else { 255 }),
            None => Array2::from_elem(self.bands[slot].dim(), 255),
        };
        Ok(mask)
    }
}

/// The three resolution-group rasters of one scene, kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    groups: HashMap<ResolutionGroup, InMemoryRaster>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: ResolutionGroup, raster: InMemoryRaster) -> Self {
        self.groups.insert(group, raster);
        self
    }
}

impl StackSources for InMemoryScene {
    type Source = InMemoryRaster;

    fn open(&self, group: ResolutionGroup) -> FireResult<InMemoryRaster> {
        self.groups
            .get(&group)
            .cloned()
            .ok_or_else(|| FireError::UpstreamIo(format!("no {} raster in scene", group)))
    }
}
