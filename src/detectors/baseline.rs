//! Scene-adaptive normalized-difference detector
//!
//! Flags pixels where `ndi(B12, B8A)` exceeds its scene mean by more than
//! `sigmas` standard deviations. The statistics are recomputed over the
//! whole stack on every call, background included.

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, mean_std, normalized_difference};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B8A];

#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl Detector for Baseline {
    fn name(&self) -> &str {
        "Baseline"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b8a = input(stack, LogicalBand::B8A, self.name())?;
        let sigmas = params.value("sigmas", 3.0)?;

        let ndi = normalized_difference(b12, b8a);
        let (mean, std) = mean_std(&ndi);
        let threshold = mean + sigmas * std;
        log::debug!(
            "Baseline threshold {:.4} (mean {:.4}, std {:.4})",
            threshold,
            mean,
            std
        );

        Ok(above(&ndi, threshold as f32))
    }
}
