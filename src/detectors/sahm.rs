//! Normalized SWIR difference with a B12 brightness fallback

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, normalized_difference};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B11];

/// `ndi(B12, B11) > 0.4 OR B12 > 1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct Sahm;

impl Detector for Sahm {
    fn name(&self) -> &str {
        "Sahm"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b11 = input(stack, LogicalBand::B11, self.name())?;
        let index_threshold = params.value("index_threshold", 0.4)? as f32;
        let b12_threshold = params.value("b12_threshold", 1.0)? as f32;

        let ndi = normalized_difference(b12, b11);
        Ok(&above(&ndi, index_threshold) | &above(b12, b12_threshold))
    }
}
