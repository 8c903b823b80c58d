//! Murphy et al. (2016) unambiguous and potential fire classes
//!
//! Unambiguous fire: `B12/B11 >= 1.4`, `B12/B8A >= 1.4` and `B12 >= 0.15`.
//! Potential fire, kept only next to an unambiguous pixel:
//! `B11/B8A >= 2` with `B11 >= 0.5`, or saturation in B12 or B11.
//!
//! A scene without any unambiguous pixel never evaluates the potential class.

use super::{input, Detector, DetectorParams};
use crate::core::index::{any, at_least, count, generalized_ratio};
use crate::core::morphology::{binary_dilate, StructuringElement};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

const BANDS: [LogicalBand; 3] = [LogicalBand::B12, LogicalBand::B11, LogicalBand::B8A];

/// Detection mask and whether the potential-fire stage ran
#[derive(Debug, Clone)]
pub struct MurphyReport {
    pub mask: Mask,
    pub potential_fire_evaluated: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Murphy;

impl Murphy {
    pub fn classify(
        &self,
        stack: &BufferedStack,
        params: &DetectorParams,
    ) -> FireResult<MurphyReport> {
        let b12 = input(stack, LogicalBand::B12, self.name())?;
        let b11 = input(stack, LogicalBand::B11, self.name())?;
        let b8a = input(stack, LogicalBand::B8A, self.name())?;
        let kernel = StructuringElement::square(params.kernel_size("kernel_size", 3)?)?;

        let unambiguous = &(&at_least(&generalized_ratio(b12, b11), 1.4)
            & &at_least(&generalized_ratio(b12, b8a), 1.4))
            & &at_least(b12, 0.15);

        if !any(&unambiguous) {
            log::debug!("Murphy: no unambiguous fire, potential stage skipped");
            return Ok(MurphyReport {
                mask: unambiguous,
                potential_fire_evaluated: false,
            });
        }

        let neighbourhood = binary_dilate(&unambiguous, &kernel);
        let saturated =
            stack.saturated_mask(LogicalBand::B12)? | stack.saturated_mask(LogicalBand::B11)?;
        let swir_ratio = &at_least(&generalized_ratio(b11, b8a), 2.0) & &at_least(b11, 0.5);
        let potential = &(&swir_ratio | &saturated) & &neighbourhood;

        log::debug!(
            "Murphy: {} unambiguous, {} potential fire pixels",
            count(&unambiguous),
            count(&potential)
        );

        Ok(MurphyReport {
            mask: &unambiguous | &potential,
            potential_fire_evaluated: true,
        })
    }
}

impl Detector for Murphy {
    fn name(&self) -> &str {
        "Murphy"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        self.classify(stack, params).map(|report| report.mask)
    }
}
