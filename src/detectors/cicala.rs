//! Cicala et al. (2018) SWIR ratio indices

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, generalized_ratio};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 3] = [LogicalBand::B12, LogicalBand::B11, LogicalBand::B8A];
const BASELINE_BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B8A];

/// `B12/B8A + B12/B11 + alpha * B8A/B11 > threshold` on radiance
///
/// Only the three SWIR/NIR inputs are converted, so the calibration
/// coefficients need not cover other buffered bands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cicala;

impl Detector for Cicala {
    fn name(&self) -> &str {
        "Cicala"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let calibration = params.calibration(self.name())?;
        let alpha = params.value("alpha", 0.5)? as f32;
        let threshold = params.value("threshold", 5.0)? as f32;

        let [b12, b11, b8a] = BANDS.map(|band| {
            input(stack, band, self.name()).and_then(|values| calibration.radiance(band, values))
        });
        let (b12, b11, b8a) = (b12?, b11?, b8a?);

        let afi = generalized_ratio(&b12, &b8a) + generalized_ratio(&b12, &b11)
            + generalized_ratio(&b8a, &b11).mapv_into(|v| v * alpha);

        Ok(above(&afi, threshold))
    }
}

/// `B12 / B8A > 0.5` on reflectance
#[derive(Debug, Clone, Copy, Default)]
pub struct CicalaBaseline;

impl Detector for CicalaBaseline {
    fn name(&self) -> &str {
        "CicalaBaseline"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BASELINE_BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b8a = input(stack, LogicalBand::B8A, self.name())?;
        let threshold = params.value("threshold", 0.5)? as f32;

        Ok(above(&generalized_ratio(b12, b8a), threshold))
    }
}
