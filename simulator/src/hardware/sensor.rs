//! Sensor, optics and sky configuration for detector simulation

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use crate::{Result, SimulationError};

/// Arcseconds per degree
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Complete exposure, sensor, optics and sky parameter set
///
/// Every field must be supplied; there is no partial merging. Call
/// [`SensorParams::validate`] (done by
/// [`SimulatedSkyImage::new`](crate::SimulatedSkyImage::new)) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorParams {
    /// Exposure duration in seconds
    pub exposure_s: f64,
    /// Saturation level of the ADC in ADU
    pub max_adu: u16,
    /// Bias offset added to every pixel in ADU
    pub bias_offset_adu: f64,
    /// Gain in electrons per ADU
    pub gain_e_per_adu: f64,
    /// Read noise in electrons RMS
    pub read_noise_e: f64,
    /// Dark current in electrons per second per output pixel
    pub dark_current_e_per_s: f64,
    /// On-chip binning factors (x, y)
    pub binning: (u32, u32),
    /// Physical (unbinned) pixel pitch in meters (x, y)
    pub pixel_size_m: (f64, f64),
    /// Effective focal length in meters
    pub focal_length_m: f64,
    /// Clear aperture diameter in meters
    pub aperture_diameter_m: f64,
    /// Sky background in electrons per m² per arcsec² per second
    pub sky_background_e_per_m2_arcsec2_s: f64,
    /// Seeing FWHM in arcseconds
    pub seeing_fwhm_arcsec: f64,
    /// Band-averaged quantum efficiency in (0, 1]
    pub quantum_efficiency: f64,
}

fn invalid(msg: String) -> SimulationError {
    SimulationError::InvalidConfiguration(msg)
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive and finite, got {value}")))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative and finite, got {value}")))
    }
}

impl SensorParams {
    /// Load parameters from a JSON file and validate them
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let params: SensorParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Check every field, naming the first offending one
    pub fn validate(&self) -> Result<()> {
        require_positive("exposure_s", self.exposure_s)?;
        if self.max_adu == 0 {
            return Err(invalid("max_adu must be positive".to_string()));
        }
        if !self.bias_offset_adu.is_finite() {
            return Err(invalid("bias_offset_adu must be finite".to_string()));
        }
        require_positive("gain_e_per_adu", self.gain_e_per_adu)?;
        require_non_negative("read_noise_e", self.read_noise_e)?;
        require_non_negative("dark_current_e_per_s", self.dark_current_e_per_s)?;
        if self.binning.0 == 0 || self.binning.1 == 0 {
            return Err(invalid(format!(
                "binning factors must be at least 1, got {:?}",
                self.binning
            )));
        }
        require_positive("pixel_size_m.x", self.pixel_size_m.0)?;
        require_positive("pixel_size_m.y", self.pixel_size_m.1)?;
        require_positive("focal_length_m", self.focal_length_m)?;
        require_positive("aperture_diameter_m", self.aperture_diameter_m)?;
        require_non_negative(
            "sky_background_e_per_m2_arcsec2_s",
            self.sky_background_e_per_m2_arcsec2_s,
        )?;
        require_positive("seeing_fwhm_arcsec", self.seeing_fwhm_arcsec)?;
        if !(self.quantum_efficiency > 0.0 && self.quantum_efficiency <= 1.0) {
            return Err(invalid(format!(
                "quantum_efficiency must be in (0, 1], got {}",
                self.quantum_efficiency
            )));
        }
        Ok(())
    }

    /// Collecting area π(D/2)² in m²
    pub fn aperture_area_m2(&self) -> f64 {
        PI * (self.aperture_diameter_m / 2.0).powi(2)
    }

    /// Plate scale of an output (binned) pixel in degrees per pixel (x, y)
    pub fn pixel_scale_deg(&self) -> (f64, f64) {
        let scale = |pitch: f64, bin: u32| (pitch * bin as f64 / self.focal_length_m).to_degrees();
        (
            scale(self.pixel_size_m.0, self.binning.0),
            scale(self.pixel_size_m.1, self.binning.1),
        )
    }

    /// Plate scale of an output pixel in arcseconds per pixel (x, y)
    pub fn pixel_scale_arcsec(&self) -> (f64, f64) {
        let (sx, sy) = self.pixel_scale_deg();
        (sx * ARCSEC_PER_DEG, sy * ARCSEC_PER_DEG)
    }

    /// Sky electrons per output pixel per second
    pub fn sky_electrons_per_pixel_per_s(&self) -> f64 {
        let (sx, sy) = self.pixel_scale_arcsec();
        self.sky_background_e_per_m2_arcsec2_s * self.aperture_area_m2() * sx * sy
    }

    /// Seeing FWHM in output pixels along (x, y)
    pub fn seeing_fwhm_pixels(&self) -> (f64, f64) {
        let (sx, sy) = self.pixel_scale_arcsec();
        (self.seeing_fwhm_arcsec / sx, self.seeing_fwhm_arcsec / sy)
    }

    /// Copy with a different exposure time
    pub fn with_exposure(&self, exposure_s: f64) -> Self {
        Self {
            exposure_s,
            ..self.clone()
        }
    }
}

/// Standard sensor/optics presets
pub mod models {
    use super::*;

    /// 8" f/10 Schmidt-Cassegrain with a cooled KAF-8300 class CCD, suburban sky
    pub static SCT8_KAF8300: Lazy<SensorParams> = Lazy::new(|| SensorParams {
        exposure_s: 30.0,
        max_adu: 65535,
        bias_offset_adu: 100.0,
        gain_e_per_adu: 0.37,
        read_noise_e: 9.0,
        dark_current_e_per_s: 0.02,
        binning: (1, 1),
        pixel_size_m: (5.4e-6, 5.4e-6),
        focal_length_m: 2.032,
        aperture_diameter_m: 0.203,
        sky_background_e_per_m2_arcsec2_s: 3.0,
        seeing_fwhm_arcsec: 2.5,
        quantum_efficiency: 0.45,
    });

    /// 80 mm f/6 refractor with a back-illuminated CMOS camera, dark site
    pub static REFRACTOR80_IMX455: Lazy<SensorParams> = Lazy::new(|| SensorParams {
        exposure_s: 60.0,
        max_adu: 65535,
        bias_offset_adu: 50.0,
        gain_e_per_adu: 0.8,
        read_noise_e: 2.67,
        dark_current_e_per_s: 0.002,
        binning: (1, 1),
        pixel_size_m: (3.76e-6, 3.76e-6),
        focal_length_m: 0.48,
        aperture_diameter_m: 0.08,
        sky_background_e_per_m2_arcsec2_s: 1.0,
        seeing_fwhm_arcsec: 3.0,
        quantum_efficiency: 0.8,
    });

    /// Look up a preset by its short name
    pub fn by_name(name: &str) -> Option<SensorParams> {
        match name.to_ascii_lowercase().as_str() {
            "sct8" | "sct8_kaf8300" => Some(SCT8_KAF8300.clone()),
            "refractor80" | "refractor80_imx455" => Some(REFRACTOR80_IMX455.clone()),
            _ => None,
        }
    }
}
