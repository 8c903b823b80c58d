//! Processing configuration for buffered stack assembly

use crate::types::{FireError, FireResult, Resampling};
use serde::{Deserialize, Serialize};

/// Divisor turning Sentinel-2 L1C digital numbers into reflectance
pub const DEFAULT_QUANTIFICATION_VALUE: f32 = 10000.0;

/// Raw DN written by the ground segment for saturated 16-bit pixels
pub const SATURATION_VALUE: f32 = 65535.0;

/// Working resolution used when none is configured (metres)
pub const DEFAULT_WORKING_RESOLUTION: f64 = 20.0;

/// How bands are materialized into a buffered stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Common pixel size of every buffered band, in metres
    pub working_resolution: f64,
    /// Interpolation for bands whose native resolution differs
    pub resampling: Resampling,
    /// Reflectance divisor when no calibration metadata is attached
    pub quantification_value: f32,
    /// Keep digital numbers instead of reflectance
    pub raw: bool,
    /// Zero invalid pixels once every band is loaded
    pub apply_validity_mask: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            working_resolution: DEFAULT_WORKING_RESOLUTION,
            resampling: Resampling::Nearest,
            quantification_value: DEFAULT_QUANTIFICATION_VALUE,
            raw: false,
            apply_validity_mask: false,
        }
    }
}

impl StackConfig {
    pub fn with_working_resolution(mut self, meters: f64) -> Self {
        self.working_resolution = meters;
        self
    }

    pub fn with_resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }

    pub fn validate(&self) -> FireResult<()> {
        validate_working_resolution(self.working_resolution)?;

        if !(self.quantification_value.is_finite() && self.quantification_value > 0.0) {
            return Err(FireError::invalid_parameter(
                "quantification_value",
                self.quantification_value,
                "must be a positive number",
            ));
        }

        Ok(())
    }
}

pub(crate) fn validate_working_resolution(meters: f64) -> FireResult<()> {
    if meters.is_finite() && meters > 0.0 {
        Ok(())
    } else {
        Err(FireError::invalid_parameter(
            "working_resolution",
            meters,
            "must be a positive number of metres",
        ))
    }
}
