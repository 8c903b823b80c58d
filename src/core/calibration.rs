use crate::config::DEFAULT_QUANTIFICATION_VALUE;
use crate::io::metadata::{ProductMetadata, TileMetadata};
use crate::types::{FireError, FireResult, LogicalBand};
use chrono::{DateTime, Datelike, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;

/// Per-band radiometric conversion inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandCoefficients {
    /// Exo-atmospheric solar irradiance (W/m²/µm)
    pub solar_irradiance: f64,
    /// Zenith angle applied to the band, degrees
    pub zenith_angle_deg: f64,
}

/// Reflectance-to-radiance coefficients of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCoefficients {
    pub quantification_value: f32,
    /// Earth-Sun distance correction factor `U` (1 / d²)
    pub earth_sun_factor: f64,
    pub bands: BTreeMap<LogicalBand, BandCoefficients>,
}

impl CalibrationCoefficients {
    pub fn new(quantification_value: f32, earth_sun_factor: f64) -> Self {
        Self {
            quantification_value,
            earth_sun_factor,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_band(mut self, band: LogicalBand, solar_irradiance: f64, zenith_angle_deg: f64) -> Self {
        self.bands.insert(
            band,
            BandCoefficients {
                solar_irradiance,
                zenith_angle_deg,
            },
        );
        self
    }

    pub fn band(&self, band: LogicalBand) -> FireResult<&BandCoefficients> {
        self.bands.get(&band).ok_or_else(|| {
            FireError::MissingInput(format!("no calibration coefficients for band {}", band))
        })
    }

    /// Top-of-atmosphere radiance: `L = ρ · E_sun · cos(θ) · U / π`
    pub fn radiance(&self, band: LogicalBand, reflectance: &Array2<f32>) -> FireResult<Array2<f32>> {
        let coefficients = self.band(band)?;
        let gain = coefficients.solar_irradiance
            * coefficients.zenith_angle_deg.to_radians().cos()
            * self.earth_sun_factor
            / PI;

        log::debug!("Radiance gain for {}: {:.6}", band, gain);

        Ok(reflectance.mapv(|rho| (rho as f64 * gain) as f32))
    }

    /// Combine product and tile metadata documents
    ///
    /// Each band takes its mean viewing incidence zenith when the tile lists
    /// one, else the mean sun zenith. A missing `U` is derived from the
    /// sensing date.
    pub fn from_metadata(product: &ProductMetadata, tile: &TileMetadata) -> FireResult<Self> {
        let earth_sun_factor = match product.u {
            Some(u) => u,
            None => {
                let sensing_time = product.sensing_time.or(tile.sensing_time).ok_or_else(|| {
                    FireError::Metadata(
                        "metadata has neither U nor a sensing time to derive it".to_string(),
                    )
                })?;
                earth_sun_factor(sensing_time)
            }
        };

        let quantification_value = product
            .quantification_value
            .unwrap_or(DEFAULT_QUANTIFICATION_VALUE);

        let mut coefficients = Self::new(quantification_value, earth_sun_factor);

        for (&id, &irradiance) in &product.solar_irradiance {
            let Some(band) = product.band_for_id(id) else {
                log::warn!("Ignoring solar irradiance for unknown bandId {}", id);
                continue;
            };

            let zenith = tile
                .viewing_zenith_deg
                .get(&id)
                .copied()
                .or(tile.sun_zenith_deg)
                .ok_or_else(|| FireError::Metadata(format!("no zenith angle for band {}", band)))?;

            coefficients = coefficients.with_band(band, irradiance, zenith);
        }

        log::info!(
            "Loaded calibration for {} bands (U={:.6}, quantification={})",
            coefficients.bands.len(),
            coefficients.earth_sun_factor,
            coefficients.quantification_value
        );

        Ok(coefficients)
    }

    pub fn from_xml(product_xml: &str, tile_xml: &str) -> FireResult<Self> {
        let product = ProductMetadata::parse(product_xml)?;
        let tile = TileMetadata::parse(tile_xml)?;
        Self::from_metadata(&product, &tile)
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(product_xml: P, tile_xml: Q) -> FireResult<Self> {
        log::debug!(
            "Reading calibration metadata: {} / {}",
            product_xml.as_ref().display(),
            tile_xml.as_ref().display()
        );
        let product = std::fs::read_to_string(product_xml)?;
        let tile = std::fs::read_to_string(tile_xml)?;
        Self::from_xml(&product, &tile)
    }
}

/// Earth-Sun distance factor `U` for a date
pub fn earth_sun_factor(time: DateTime<Utc>) -> f64 {
    let day_of_year = time.ordinal() as f64;
    let d = 1.0 - 0.01672 * (0.0172 * (day_of_year - 4.0)).cos();
    1.0 / (d * d)
}
