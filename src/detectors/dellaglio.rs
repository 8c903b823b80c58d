//! Dell'Aglio et al. (2020) generalized-ratio indices
//!
//! The papers publish no single threshold for these indices, so the
//! `threshold` option has to be supplied by the caller.

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, generalized_ratio};
use crate::core::stack::BufferedStack;
use crate::types::{FireResult, LogicalBand, Mask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DellaglioIndex {
    /// AFD5: `B12 / B11`
    Afd5,
    /// AFD3: `B12 / B8`
    Afd3,
    /// AFD4: `B11 / B8`
    Afd4,
}

const AFD5_BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B11];
const AFD3_BANDS: [LogicalBand; 2] = [LogicalBand::B12, LogicalBand::B8];
const AFD4_BANDS: [LogicalBand; 2] = [LogicalBand::B11, LogicalBand::B8];

impl DellaglioIndex {
    /// (numerator, denominator) of the ratio
    fn bands(&self) -> &'static [LogicalBand; 2] {
        match self {
            DellaglioIndex::Afd5 => &AFD5_BANDS,
            DellaglioIndex::Afd3 => &AFD3_BANDS,
            DellaglioIndex::Afd4 => &AFD4_BANDS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dellaglio {
    index: DellaglioIndex,
}

impl Dellaglio {
    pub fn new(index: DellaglioIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> DellaglioIndex {
        self.index
    }
}

impl Default for Dellaglio {
    fn default() -> Self {
        Self::new(DellaglioIndex::Afd5)
    }
}

impl Detector for Dellaglio {
    fn name(&self) -> &str {
        match self.index {
            DellaglioIndex::Afd5 => "Dellaglio",
            DellaglioIndex::Afd3 => "Dellaglio3",
            DellaglioIndex::Afd4 => "Dellaglio4",
        }
    }

    fn required_bands(&self) -> &[LogicalBand] {
        self.index.bands()
    }

    fn detect(&self, stack: &BufferedStack, params: &DetectorParams) -> FireResult<Mask> {
        let threshold = params.required("threshold", self.name())? as f32;

        let [numerator, denominator] = *self.index.bands();
        let a = input(stack, numerator, self.name())?;
        let b = input(stack, denominator, self.name())?;

        Ok(above(&generalized_ratio(a, b), threshold))
    }
}
