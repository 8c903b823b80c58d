//! Biome-specific visible/SWIR detectors
//!
//! Each biome flags pixels where the red band stays below a linear function
//! of B12 (`B4 <= a * B12 + b`), tightened with SWIR conditions for the
//! tropical moist and Mediterranean biomes. Which biome applies to a scene
//! is decided by the caller.

use super::{input, Detector, DetectorParams};
use crate::core::index::{at_least, generalized_ratio};
use crate::core::stack::BufferedStack;
use crate::types::{BandImage, FireResult, LogicalBand, Mask};
use ndarray::Zip;

const BANDS_B4_B12: [LogicalBand; 2] = [LogicalBand::B4, LogicalBand::B12];
const BANDS_B4_B11_B12: [LogicalBand; 3] = [LogicalBand::B4, LogicalBand::B11, LogicalBand::B12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    TropicalMoistForest,
    TropicalDryForest,
    Savanna,
    MediterraneanForest,
    ConiferForest,
    Taiga,
}

impl Biome {
    pub const ALL: [Biome; 6] = [
        Biome::TropicalMoistForest,
        Biome::TropicalDryForest,
        Biome::Savanna,
        Biome::MediterraneanForest,
        Biome::ConiferForest,
        Biome::Taiga,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Biome::TropicalMoistForest => "TropicalMoistForest",
            Biome::TropicalDryForest => "TropicalDryForest",
            Biome::Savanna => "Savanna",
            Biome::MediterraneanForest => "MediterraneanForest",
            Biome::ConiferForest => "ConiferForest",
            Biome::Taiga => "Taiga",
        }
    }

    /// Slope and intercept of the B4 limit
    fn red_limit(&self) -> (f32, f32) {
        match self {
            Biome::TropicalMoistForest => (1.045, -0.071),
            Biome::TropicalDryForest => (0.681, -0.052),
            Biome::Savanna => (0.677, -0.052),
            Biome::MediterraneanForest => (0.743, -0.068),
            Biome::ConiferForest => (0.504, -0.198),
            Biome::Taiga => (0.727, -0.11),
        }
    }

    fn bands(&self) -> &'static [LogicalBand] {
        match self {
            Biome::TropicalMoistForest | Biome::MediterraneanForest => &BANDS_B4_B11_B12,
            _ => &BANDS_B4_B12,
        }
    }
}

/// `B4 <= a * B12 + b`
pub fn red_below_swir(b4: &BandImage, b12: &BandImage, slope: f32, intercept: f32) -> Mask {
    Zip::from(b4)
        .and(b12)
        .map_collect(|&red, &swir| red <= slope * swir + intercept)
}

/// `B11 >= b11_min OR B12 >= b12_min`
pub fn swir_bright(b11: &BandImage, b12: &BandImage, b11_min: f32, b12_min: f32) -> Mask {
    &at_least(b11, b11_min) | &at_least(b12, b12_min)
}

#[derive(Debug, Clone, Copy)]
pub struct BiomeDetector {
    biome: Biome,
}

impl BiomeDetector {
    pub fn new(biome: Biome) -> Self {
        Self { biome }
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }
}

impl Detector for BiomeDetector {
    fn name(&self) -> &str {
        self.biome.name()
    }

    fn required_bands(&self) -> &[LogicalBand] {
        self.biome.bands()
    }

    fn detect(&self, stack: &BufferedStack, _params: &DetectorParams) -> FireResult<Mask> {
        let b4 = input(stack, LogicalBand::B4, self.name())?;
        let b12 = input(stack, LogicalBand::B12, self.name())?;

        let (slope, intercept) = self.biome.red_limit();
        let c1 = red_below_swir(b4, b12, slope, intercept);

        let mask = match self.biome {
            Biome::TropicalMoistForest => {
                let b11 = input(stack, LogicalBand::B11, self.name())?;
                &c1 & &at_least(&generalized_ratio(b12, b11), 1.0)
            }
            Biome::MediterraneanForest => {
                let b11 = input(stack, LogicalBand::B11, self.name())?;
                &(&c1 & &at_least(b12, 0.355)) & &swir_bright(b11, b12, 0.475, 1.0)
            }
            _ => c1,
        };

        Ok(mask)
    }
}
