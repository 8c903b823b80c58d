use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reflectance-like band values (DN / quantification, or raw DN when requested)
pub type BandImage = Array2<f32>;

/// Boolean per-pixel mask (validity, saturation, detection)
pub type Mask = Array2<bool>;

/// All loaded bands stacked along a trailing channel axis (rows x cols x bands)
pub type BandCube = Array3<f32>;

/// Sentinel-2 MSI spectral band, independent of the resolution it is stored at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogicalBand {
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B8A,
    B9,
    B10,
    B11,
    B12,
}

impl LogicalBand {
    /// Every band, in spectral order
    pub const ALL: [LogicalBand; 13] = [
        LogicalBand::B1,
        LogicalBand::B2,
        LogicalBand::B3,
        LogicalBand::B4,
        LogicalBand::B5,
        LogicalBand::B6,
        LogicalBand::B7,
        LogicalBand::B8,
        LogicalBand::B8A,
        LogicalBand::B9,
        LogicalBand::B10,
        LogicalBand::B11,
        LogicalBand::B12,
    ];

    /// Band from its integer identifier (1-12). 8A has no integer form.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(LogicalBand::B1),
            2 => Some(LogicalBand::B2),
            3 => Some(LogicalBand::B3),
            4 => Some(LogicalBand::B4),
            5 => Some(LogicalBand::B5),
            6 => Some(LogicalBand::B6),
            7 => Some(LogicalBand::B7),
            8 => Some(LogicalBand::B8),
            9 => Some(LogicalBand::B9),
            10 => Some(LogicalBand::B10),
            11 => Some(LogicalBand::B11),
            12 => Some(LogicalBand::B12),
            _ => None,
        }
    }

    /// Zero-based `bandId` used by the product metadata (B1=0 ... B8A=8 ... B12=12)
    pub fn metadata_id(&self) -> u8 {
        match self {
            LogicalBand::B1 => 0,
            LogicalBand::B2 => 1,
            LogicalBand::B3 => 2,
            LogicalBand::B4 => 3,
            LogicalBand::B5 => 4,
            LogicalBand::B6 => 5,
            LogicalBand::B7 => 6,
            LogicalBand::B8 => 7,
            LogicalBand::B8A => 8,
            LogicalBand::B9 => 9,
            LogicalBand::B10 => 10,
            LogicalBand::B11 => 11,
            LogicalBand::B12 => 12,
        }
    }

    pub fn from_metadata_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }
}

impl fmt::Display for LogicalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalBand::B1 => "B1",
            LogicalBand::B2 => "B2",
            LogicalBand::B3 => "B3",
            LogicalBand::B4 => "B4",
            LogicalBand::B5 => "B5",
            LogicalBand::B6 => "B6",
            LogicalBand::B7 => "B7",
            LogicalBand::B8 => "B8",
            LogicalBand::B8A => "B8A",
            LogicalBand::B9 => "B9",
            LogicalBand::B10 => "B10",
            LogicalBand::B11 => "B11",
            LogicalBand::B12 => "B12",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for LogicalBand {
    type Err = FireError;

    /// Accepts "12", "B12", "b12", "B01", "8A", "8a" and "B8A"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let id = upper.strip_prefix('B').unwrap_or(&upper);

        if id == "8A" {
            return Ok(LogicalBand::B8A);
        }

        id.parse::<u8>()
            .ok()
            .and_then(LogicalBand::from_number)
            .ok_or_else(|| FireError::UnknownBand(trimmed.to_string()))
    }
}

impl TryFrom<u8> for LogicalBand {
    type Error = FireError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        LogicalBand::from_number(number).ok_or_else(|| FireError::UnknownBand(number.to_string()))
    }
}

/// Physical storage group of a Sentinel-2 band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionGroup {
    R10m,
    R20m,
    R60m,
}

impl ResolutionGroup {
    pub const ALL: [ResolutionGroup; 3] = [
        ResolutionGroup::R10m,
        ResolutionGroup::R20m,
        ResolutionGroup::R60m,
    ];

    /// Native ground sampling distance in metres
    pub fn meters(&self) -> f64 {
        match self {
            ResolutionGroup::R10m => 10.0,
            ResolutionGroup::R20m => 20.0,
            ResolutionGroup::R60m => 60.0,
        }
    }

    /// Suffix used by the per-group stack files (`<name>_20m_stack.tif`)
    pub fn suffix(&self) -> &'static str {
        match self {
            ResolutionGroup::R10m => "10m",
            ResolutionGroup::R20m => "20m",
            ResolutionGroup::R60m => "60m",
        }
    }
}

impl fmt::Display for ResolutionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Interpolation used when a band is read onto a different pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
}

/// Affine pixel-to-map transformation (GDAL coefficient order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform without rotation terms
    pub fn north_up(top_left_x: f64, top_left_y: f64, pixel_size: f64) -> Self {
        Self {
            top_left_x,
            pixel_width: pixel_size,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height: -pixel_size,
        }
    }

    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            top_left_x: coeffs[0],
            pixel_width: coeffs[1],
            rotation_x: coeffs[2],
            top_left_y: coeffs[3],
            rotation_y: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map coordinates of the centre of pixel (row, col)
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;

        let x = self.top_left_x + col_f * self.pixel_width + row_f * self.rotation_x;
        let y = self.top_left_y + col_f * self.rotation_y + row_f * self.pixel_height;

        (x, y)
    }

    /// Transform of the same footprint sampled `scale` times denser
    pub fn rescaled(&self, scale: f64) -> Self {
        Self {
            top_left_x: self.top_left_x,
            pixel_width: self.pixel_width / scale,
            rotation_x: self.rotation_x / scale,
            top_left_y: self.top_left_y,
            rotation_y: self.rotation_y / scale,
            pixel_height: self.pixel_height / scale,
        }
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }
}

/// Positional metadata of one buffered band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMeta {
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
    pub crs: Option<String>,
}

impl RasterMeta {
    /// Shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Error types for band stacking and fire detection
#[derive(Debug, thiserror::Error)]
pub enum FireError {
    #[error("Unknown band: {0}")]
    UnknownBand(String),

    #[error("Shape mismatch for band {band}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        band: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    #[error("Raster I/O error: {0}")]
    UpstreamIo(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for FireError {
    fn from(e: gdal::errors::GdalError) -> Self {
        FireError::UpstreamIo(e.to_string())
    }
}

impl FireError {
    pub(crate) fn invalid_parameter(
        name: impl Into<String>,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        FireError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for stacking and detection operations
pub type FireResult<T> = Result<T, FireError>;
