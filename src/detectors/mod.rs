//! Active-fire detection strategies
//!
//! Every detector evaluates a published per-pixel rule against a
//! [`BufferedStack`] and returns a boolean mask on the stack grid.
//! [`Detector::transform`] intersects the result with the stack validity
//! mask, so invalid pixels are never reported as fire.

pub mod baseline;
pub mod biome;
pub mod cicala;
pub mod dellaglio;
pub mod kato_nakamura;
pub mod liangrocapart;
pub mod murphy;
pub mod pierre_markuse;
pub mod registry;
pub mod sahm;
pub mod yongxue;

pub use baseline::Baseline;
pub use biome::{Biome, BiomeDetector};
pub use cicala::{Cicala, CicalaBaseline};
pub use dellaglio::{Dellaglio, DellaglioIndex};
pub use kato_nakamura::KatoNakamura;
pub use liangrocapart::{Liangrocapart, LiangrocapartRemains};
pub use murphy::{Murphy, MurphyReport};
pub use pierre_markuse::PierreMarkuse;
pub use registry::{get_detector, DetectorRegistry};
pub use sahm::Sahm;
pub use yongxue::Yongxue;

use crate::core::calibration::CalibrationCoefficients;
use crate::core::index;
use crate::core::morphology::MAX_KERNEL_SIZE;
use crate::core::stack::BufferedStack;
use crate::types::{BandImage, FireError, FireResult, LogicalBand, Mask};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named fire detection rule
pub trait Detector: Send + Sync {
    /// Registry name of the detector
    fn name(&self) -> &str;

    /// Bands that must be buffered in the stack
    fn required_bands(&self) -> &[LogicalBand];

    /// Raw detection mask, before validity masking
    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask>;

    /// Detection mask restricted to pixels valid in every buffered band
    fn transform(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        log::info!("Running {} detector", self.name());

        let detection = self.detect(stack, params)?;
        let valid = stack.read_validity_mask(None)?;
        let mask = &detection & &valid;

        log::debug!(
            "{}: {} pixels flagged, {} after validity masking",
            self.name(),
            index::count(&detection),
            index::count(&mask)
        );
        Ok(mask)
    }
}

/// Per-call inputs of a detector
///
/// `options` holds the tunable thresholds by name; detectors fall back to
/// their published defaults for anything not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub calibration: Option<CalibrationCoefficients>,
    pub options: BTreeMap<String, f64>,
}

impl DetectorParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calibration(mut self, calibration: CalibrationCoefficients) -> Self {
        self.calibration = Some(calibration);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: f64) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Calibration coefficients, required by radiance-based detectors
    pub fn calibration(&self, detector: &str) -> FireResult<&CalibrationCoefficients> {
        self.calibration.as_ref().ok_or_else(|| {
            FireError::MissingInput(format!("{} needs calibration coefficients", detector))
        })
    }

    /// Option value or `default`; NaN is rejected
    pub fn value(&self, name: &str, default: f64) -> FireResult<f64> {
        match self.options.get(name) {
            Some(&value) => finite(name, value),
            None => Ok(default),
        }
    }

    /// Option that has no published default
    pub fn required(&self, name: &str, detector: &str) -> FireResult<f64> {
        let value = self.options.get(name).copied().ok_or_else(|| {
            FireError::MissingInput(format!("{} needs the '{}' option", detector, name))
        })?;
        finite(name, value)
    }

    pub fn positive(&self, name: &str, default: f64) -> FireResult<f64> {
        let value = self.value(name, default)?;
        if value <= 0.0 {
            return Err(FireError::invalid_parameter(name, value, "must be positive"));
        }
        Ok(value)
    }

    /// Structuring element or window size: a positive odd integer
    pub fn kernel_size(&self, name: &str, default: usize) -> FireResult<usize> {
        let value = self.value(name, default as f64)?;
        if value <= 0.0 || value.fract() != 0.0 || (value as usize) % 2 == 0 {
            return Err(FireError::invalid_parameter(
                name,
                value,
                "kernel size must be a positive odd integer",
            ));
        }
        if value > MAX_KERNEL_SIZE as f64 {
            return Err(FireError::invalid_parameter(
                name,
                value,
                format!("kernel size must not exceed {}", MAX_KERNEL_SIZE),
            ));
        }
        Ok(value as usize)
    }
}

fn finite(name: &str, value: f64) -> FireResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FireError::invalid_parameter(name, value, "must be a finite number"))
    }
}

/// Buffered values of a band a detector depends on
pub(crate) fn input<'a>(
    stack: &'a BufferedStack,
    band: LogicalBand,
    detector: &str,
) -> FireResult<&'a BandImage> {
    stack.read(band).ok_or_else(|| {
        FireError::MissingInput(format!("{} needs band {} in the stack", detector, band))
    })
}
