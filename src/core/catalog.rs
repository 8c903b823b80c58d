//! Static mapping of logical Sentinel-2 bands onto the per-resolution stack files

use crate::config::validate_working_resolution;
use crate::types::{FireError, FireResult, LogicalBand, ResolutionGroup};

/// 10 m stack band order
const STACK_10M_BANDS: [LogicalBand; 4] = [
    LogicalBand::B2,
    LogicalBand::B3,
    LogicalBand::B4,
    LogicalBand::B8,
];

/// 20 m stack band order
const STACK_20M_BANDS: [LogicalBand; 6] = [
    LogicalBand::B5,
    LogicalBand::B6,
    LogicalBand::B7,
    LogicalBand::B8A,
    LogicalBand::B11,
    LogicalBand::B12,
];

/// 60 m stack band order
const STACK_60M_BANDS: [LogicalBand; 3] = [LogicalBand::B1, LogicalBand::B9, LogicalBand::B10];

/// Where a logical band is physically stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandLocation {
    pub group: ResolutionGroup,
    /// 1-based band index inside the group's raster
    pub band_index: usize,
}

/// Band catalog over the three disjoint resolution groups
pub struct BandCatalog;

impl BandCatalog {
    /// Bands stored in a group, in physical order
    pub fn bands(group: ResolutionGroup) -> &'static [LogicalBand] {
        match group {
            ResolutionGroup::R10m => &STACK_10M_BANDS,
            ResolutionGroup::R20m => &STACK_20M_BANDS,
            ResolutionGroup::R60m => &STACK_60M_BANDS,
        }
    }

    pub fn resolve(band: LogicalBand) -> BandLocation {
        use LogicalBand::*;
        use ResolutionGroup::*;

        let (group, band_index) = match band {
            B2 => (R10m, 1),
            B3 => (R10m, 2),
            B4 => (R10m, 3),
            B8 => (R10m, 4),
            B5 => (R20m, 1),
            B6 => (R20m, 2),
            B7 => (R20m, 3),
            B8A => (R20m, 4),
            B11 => (R20m, 5),
            B12 => (R20m, 6),
            B1 => (R60m, 1),
            B9 => (R60m, 2),
            B10 => (R60m, 3),
        };

        BandLocation { group, band_index }
    }

    /// Resolve a textual identifier ("12", "8A", "B8A", ...)
    pub fn resolve_name(name: &str) -> FireResult<(LogicalBand, BandLocation)> {
        let band: LogicalBand = name.parse()?;
        Ok((band, Self::resolve(band)))
    }

    /// Physical band index of `band` inside `group`, if that group stores it
    pub fn index_in(group: ResolutionGroup, band: LogicalBand) -> FireResult<usize> {
        let location = Self::resolve(band);
        if location.group != group {
            return Err(FireError::UnknownBand(format!(
                "{} is stored in the {} group, not {}",
                band, location.group, group
            )));
        }
        Ok(location.band_index)
    }

    /// Native-to-working pixel ratio (`native / working`); 1.0 means no resampling
    pub fn scale_factor(band: LogicalBand, working_resolution: f64) -> FireResult<f64> {
        validate_working_resolution(working_resolution)?;
        Ok(Self::resolve(band).group.meters() / working_resolution)
    }
}
