//! Kato & Nakamura radiance-based detector

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, below, generalized_ratio};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 3] = [LogicalBand::B12, LogicalBand::B11, LogicalBand::B8A];

/// `B12/B8A > 5`, `B8A < 0.6`, `L12 > 0.3` and
/// `1.65 < (B12 - B8A) / (B11 - B8A) < 33`
///
/// `L12` is the B12 radiance, so calibration coefficients are required.
#[derive(Debug, Clone, Copy, Default)]
pub struct KatoNakamura;

impl Detector for KatoNakamura {
    fn name(&self) -> &str {
        "KatoNakamura"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let calibration = params.calibration(self.name())?;
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b11 = input(stack, LogicalBand::B11, self.name())?;
        let b8a = input(stack, LogicalBand::B8A, self.name())?;

        let ratio = &above(&generalized_ratio(b12, b8a), 5.0) & &below(b8a, 0.6);

        let l12 = calibration.radiance(LogicalBand::B12, b12)?;
        let bright = &ratio & &above(&l12, 0.3);

        let false_alarm = generalized_ratio(&(b12 - b8a), &(b11 - b8a));
        let bounded = false_alarm.mapv(|v| v > 1.65 && v < 33.0);

        Ok(&bright & &bounded)
    }
}
