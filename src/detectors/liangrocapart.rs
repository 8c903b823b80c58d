//! Crown fire and smoulder classes from two SWIR normalized differences
//!
//! With `ndi1 = ndi(B11, B8A)` and `ndi2 = ndi(B12, B11)`:
//!
//! - high-temperature crown fire: `B12 > 1.2` and `ndi1 > ndi2`
//! - typical crown fire: `B12 > 1.0`
//! - smoulder area: `0.8 <= B12 <= 1.0` and `ndi2 > 0.2`
//!
//! The detection is the union of the three classes. The burnt-remains class
//! (`B12 < 0.8` and `ndi1 > -0.27`) is not part of it and is exposed as the
//! separate [`LiangrocapartRemains`] detector.

use super::{input, Detector, DetectorParams};
use crate::core::index::{above, below, normalized_difference, within};
use crate::core::stack::BufferedStack;
use crate::types::{BandImage, FireResult, LogicalBand, Mask};
use ndarray::Zip;

const BANDS: [LogicalBand; 3] = [LogicalBand::B12, LogicalBand::B11, LogicalBand::B8A];

struct Indices<'a> {
    b12: &'a BandImage,
    ndi1: BandImage,
    ndi2: BandImage,
}

impl<'a> Indices<'a> {
    fn from_stack(stack: &'a BufferedStack, detector: &str) -> FireResult<Self> {
        let b12 = input(stack, LogicalBand::B12, detector)?;
        let b11 = input(stack, LogicalBand::B11, detector)?;
        let b8a = input(stack, LogicalBand::B8A, detector)?;

        Ok(Self {
            b12,
            ndi1: normalized_difference(b11, b8a),
            ndi2: normalized_difference(b12, b11),
        })
    }
}

pub fn high_temperature_crown_fire(b12: &BandImage, ndi1: &BandImage, ndi2: &BandImage) -> Mask {
    let ordered = Zip::from(ndi1).and(ndi2).map_collect(|&a, &b| a > b);
    &above(b12, 1.2) & &ordered
}

pub fn typical_crown_fire(b12: &BandImage) -> Mask {
    above(b12, 1.0)
}

pub fn smolder_area(b12: &BandImage, ndi2: &BandImage) -> Mask {
    &within(b12, 0.8, 1.0) & &above(ndi2, 0.2)
}

pub fn remains_area(b12: &BandImage, ndi1: &BandImage) -> Mask {
    &below(b12, 0.8) & &above(ndi1, -0.27)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Liangrocapart;

impl Detector for Liangrocapart {
    fn name(&self) -> &str {
        "Liangrocapart"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, _params: &DetectorParams) -> FireResult<Mask> {
        let indices = Indices::from_stack(stack, self.name())?;

        let hcf = high_temperature_crown_fire(indices.b12, &indices.ndi1, &indices.ndi2);
        let tcf = typical_crown_fire(indices.b12);
        let sma = smolder_area(indices.b12, &indices.ndi2);

        Ok(&(&hcf | &tcf) | &sma)
    }
}

/// Burnt-remains class of the same paper
#[derive(Debug, Clone, Copy, Default)]
pub struct LiangrocapartRemains;

impl Detector for LiangrocapartRemains {
    fn name(&self) -> &str {
        "LiangrocapartRemains"
    }

    fn required_bands(&self) -> &[LogicalBand] {
        &BANDS
    }

    fn detect(&self, stack: &BufferedStack, _params: &DetectorParams) -> FireResult<Mask> {
        let indices = Indices::from_stack(stack, self.name())?;
        Ok(remains_area(indices.b12, &indices.ndi1))
    }
}
