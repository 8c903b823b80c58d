//! Band stacking, spectral indices and neighbourhood operations

pub mod calibration;
pub mod catalog;
pub mod index;
pub mod morphology;
pub mod reader;
pub mod stack;
