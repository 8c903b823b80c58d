//! SWIR brightness sum

use super::{input, Detector, DetectorParams};
use crate::core::index::above;
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B11];

/// `B12 + B11 > 2 / sensitivity`
#[derive(Debug, Clone, Copy, Default)]
pub struct PierreMarkuse;

impl Detector for PierreMarkuse {
    fn name(&self) -> &str {
        "PierreMarkuse"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b11 = input(stack, LogicalBand::B11, self.name())?;
        let sensitivity = params.positive("sensitivity", 1.0)?;

        let swir = b12 + b11;
        Ok(above(&swir, (2.0 / sensitivity) as f32))
    }
}
