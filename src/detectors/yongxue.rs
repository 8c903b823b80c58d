//! Thermal anomaly index with spatial refinement
//!
//! 1. `TAI = (B12 - B11) / B8A`, negatives clipped to zero.
//! 2. Seeds: clipped TAI minus its 15x15 local mean above 0.45.
//! 3. Inside a 15x15 dilation of the seeds keep `TAI >= 0.45` pixels with
//!    `B12 - B11 > B11 - B8A` and `B12 > 0.15`.
//! 4. Add saturated pixels (`B12 >= 1` and `B11 >= 1`) 8-connected to a
//!    detection, then drop dark pixels (`B11 <= 0.05` or `B8A <= 0.01`).

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, any, at_least, at_most, count, generalized_ratio};
use crate::core::morphology::{binary_dilate, box_mean, StructuringElement};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};
use ndarray::Zip;

const BANDS: [LogicalBand; 3] = [LogicalBand::B12, LogicalBand::B11, LogicalBand::B8A];

#[derive(Debug, Clone, Copy, Default)]
pub struct Yongxue;

impl Detector for Yongxue {
    fn name(&self) -> &str {
        "Yongxue"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b11 = input(stack, LogicalBand::B11, self.name())?;
        let b8a = input(stack, LogicalBand::B8A, self.name())?;

        let threshold = params.value("threshold", 0.45)? as f32;
        let mean_window = params.kernel_size("mean_window", 15)?;
        let buffer = StructuringElement::square(params.kernel_size("buffer_size", 15)?)?;
        let neighbourhood = StructuringElement::square(params.kernel_size("saturation_size", 3)?)?;

        // Step 1
        let tai = generalized_ratio(&(b12 - b11), b8a);
        let tai_clipped = tai.mapv(|v| v.max(0.0));

        // Step 2
        let local_mean = box_mean(&tai_clipped, mean_window)?;
        let seeds = above(&(&tai_clipped - &local_mean), threshold);
        log::debug!("Yongxue: {} seed pixels", count(&seeds));

        // Step 3
        let buffer_mask = binary_dilate(&seeds, &buffer);
        let ordered = Zip::from(b12)
            .and(b11)
            .and(b8a)
            .map_collect(|&l12, &l11, &l8a| l12 - l11 > l11 - l8a);
        let candidates = &(&at_least(&tai, threshold) & &buffer_mask) & &ordered;
        let mut detected = &candidates & &above(b12, 0.15);

        // Step 4
        if any(&detected) {
            let near = binary_dilate(&detected, &neighbourhood);
            let saturated = &(&at_least(b12, 1.0) & &at_least(b11, 1.0)) & &near;
            detected = &detected | &saturated;
        }

        let dark = &at_most(b11, 0.05) | &at_most(b8a, 0.01);
        Ok(&detected & &!&dark)
    }
}
