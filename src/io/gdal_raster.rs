//! GDAL-backed raster sources for the per-resolution stack files

use crate::io::raster::{RasterSource, StackSources};
use crate::types::{FireError, FireResult, GeoTransform, Resampling, ResolutionGroup};
use gdal::raster::{GdalType, RasterBand, ResampleAlg};
use gdal::Dataset;
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// An opened GeoTIFF (or any GDAL-readable) multi-band dataset
pub struct GdalRaster {
    dataset: Dataset,
    path: PathBuf,
}

impl GdalRaster {
    pub fn open<P: AsRef<Path>>(path: P) -> FireResult<Self> {
        log::debug!("Opening raster: {}", path.as_ref().display());
        let dataset = Dataset::open(path.as_ref())?;
        Ok(Self {
            dataset,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn band(&self, band_index: usize) -> FireResult<RasterBand<'_>> {
        if band_index == 0 || band_index > self.band_count() {
            return Err(FireError::UpstreamIo(format!(
                "band index {} out of range for {} ({} bands)",
                band_index,
                self.path.display(),
                self.band_count()
            )));
        }
        Ok(self.dataset.rasterband(band_index as isize)?)
    }
}

fn to_resample_alg(resampling: Resampling) -> ResampleAlg {
    match resampling {
        Resampling::Nearest => ResampleAlg::NearestNeighbour,
        Resampling::Bilinear => ResampleAlg::Bilinear,
    }
}

fn read_window<T: Copy + GdalType>(
    band: &RasterBand<'_>,
    raster_size: (usize, usize),
    out_shape: (usize, usize),
    resampling: Option<Resampling>,
) -> FireResult<Array2<T>> {
    let (rows, cols) = out_shape;
    let buffer = band.read_as::<T>(
        (0, 0),
        raster_size,
        (cols, rows),
        resampling.map(to_resample_alg),
    )?;

    Array2::from_shape_vec((rows, cols), buffer.data)
        .map_err(|e| FireError::UpstreamIo(format!("Failed to reshape band data: {}", e)))
}

impl RasterSource for GdalRaster {
    fn width(&self) -> usize {
        self.dataset.raster_size().0
    }

    fn height(&self) -> usize {
        self.dataset.raster_size().1
    }

    fn band_count(&self) -> usize {
        self.dataset.raster_count() as usize
    }

    fn transform(&self) -> GeoTransform {
        self.dataset
            .geo_transform()
            .map(GeoTransform::from_gdal)
            .unwrap_or_default()
    }

    fn crs(&self) -> Option<String> {
        let projection = self.dataset.projection();
        if projection.is_empty() {
            None
        } else {
            Some(projection)
        }
    }

    fn read_band(&self, band_index: usize) -> FireResult<Array2<f32>> {
        let band = self.band(band_index)?;
        let size = self.dataset.raster_size();
        read_window(&band, size, (size.1, size.0), None)
    }

    fn read_mask(&self, band_index: usize) -> FireResult<Array2<u8>> {
        let mask_band = self.band(band_index)?.open_mask_band()?;
        let size = self.dataset.raster_size();
        read_window(&mask_band, size, (size.1, size.0), None)
    }

    fn read_band_resampled(
        &self,
        band_index: usize,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<Array2<f32>> {
        let band = self.band(band_index)?;
        read_window(&band, self.dataset.raster_size(), out_shape, Some(resampling))
    }

    fn read_mask_resampled(
        &self,
        band_index: usize,
        out_shape: (usize, usize),
        resampling: Resampling,
    ) -> FireResult<Array2<u8>> {
        let mask_band = self.band(band_index)?.open_mask_band()?;
        read_window(&mask_band, self.dataset.raster_size(), out_shape, Some(resampling))
    }
}

/// Stack files of one scene: `<dir>/<name>_10m_stack.tif`, `_20m_`, `_60m_`
#[derive(Debug, Clone)]
pub struct StackPaths {
    dir: PathBuf,
    partial_name: String,
}

impl StackPaths {
    pub fn new<P: AsRef<Path>>(dir: P, partial_name: &str) -> Self {
        let partial_name = partial_name.trim_end_matches(".tif").to_string();
        Self {
            dir: dir.as_ref().to_path_buf(),
            partial_name,
        }
    }

    pub fn path(&self, group: ResolutionGroup) -> PathBuf {
        self.dir
            .join(format!("{}_{}_stack.tif", self.partial_name, group.suffix()))
    }
}

impl StackSources for StackPaths {
    type Source = GdalRaster;

    fn open(&self, group: ResolutionGroup) -> FireResult<GdalRaster> {
        GdalRaster::open(self.path(group))
    }
}
