//! Magnitude to detected electron conversion
//!
//! The renderer only needs the expected number of photo-electrons a source
//! deposits during an exposure, so the conversion is a small pluggable trait.

/// Converts a catalog magnitude to expected photo-electrons
pub trait Photometry {
    /// Expected electrons collected from a source of `magnitude`
    ///
    /// # Arguments
    /// * `magnitude` - Catalog magnitude in the band the zero point refers to
    /// * `aperture_area_m2` - Clear collecting area in m²
    /// * `quantum_efficiency` - Band-averaged QE in (0, 1]
    /// * `exposure_s` - Integration time in seconds
    fn electrons(
        &self,
        magnitude: f64,
        aperture_area_m2: f64,
        quantum_efficiency: f64,
        exposure_s: f64,
    ) -> f64;
}

/// Photon flux of a magnitude 0 source in a broad visual band, photons/s/m²
pub const DEFAULT_ZERO_POINT_PHOTONS: f64 = 1.0e10;

/// Pogson magnitude scale against a fixed zero-point photon flux
///
/// `electrons = F0 · 10^(-0.4 m) · area · QE · t`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroPointPhotometry {
    /// Photons per second per m² for a magnitude 0 source
    pub zero_point_photons_per_s_m2: f64,
}

impl ZeroPointPhotometry {
    pub fn new(zero_point_photons_per_s_m2: f64) -> Self {
        Self {
            zero_point_photons_per_s_m2,
        }
    }

    /// Photon flux density of a source, photons/s/m²
    pub fn photon_flux(&self, magnitude: f64) -> f64 {
        self.zero_point_photons_per_s_m2 * 10f64.powf(-0.4 * magnitude)
    }
}

impl Default for ZeroPointPhotometry {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_POINT_PHOTONS)
    }
}

impl Photometry for ZeroPointPhotometry {
    fn electrons(
        &self,
        magnitude: f64,
        aperture_area_m2: f64,
        quantum_efficiency: f64,
        exposure_s: f64,
    ) -> f64 {
        let electrons =
            self.photon_flux(magnitude) * aperture_area_m2 * quantum_efficiency * exposure_s;
        if electrons.is_finite() && electrons > 0.0 {
            electrons
        } else {
            0.0
        }
    }
}
