//! Pixel-integrated circular Gaussian point spread function

use scilib::math::basic::erf;
use std::f64::consts::{LN_2, SQRT_2};

/// Circular Gaussian PSF in pixel units
///
/// Pixel `(i, j)` covers `[i - 0.5, i + 0.5) × [j - 0.5, j + 0.5)`, so pixel
/// centers sit on integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPsf {
    sigma: f64,
}

impl GaussianPsf {
    /// Build from a full width at half maximum in pixels
    ///
    /// Returns `None` for a non-positive or non-finite FWHM.
    pub fn from_fwhm(fwhm_px: f64) -> Option<Self> {
        Self::from_sigma(fwhm_px / (2.0 * (2.0 * LN_2).sqrt()))
    }

    pub fn from_sigma(sigma: f64) -> Option<Self> {
        (sigma.is_finite() && sigma > 0.0).then_some(Self { sigma })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn fwhm(&self) -> f64 {
        self.sigma * 2.0 * (2.0 * LN_2).sqrt()
    }

    /// Fraction of the unit flux falling in `[lo, hi)` along one axis
    fn axis_fraction(&self, lo: f64, hi: f64) -> f64 {
        let scale = self.sigma * SQRT_2;
        0.5 * (erf(hi / scale) - erf(lo / scale))
    }

    /// Fraction of the total flux landing in the pixel whose center is
    /// offset `(dx, dy)` from the PSF centroid
    pub fn pixel_fraction(&self, dx: f64, dy: f64) -> f64 {
        self.axis_fraction(dx - 0.5, dx + 0.5) * self.axis_fraction(dy - 0.5, dy + 0.5)
    }

    /// Half-width of a stamp covering `n_sigma` standard deviations
    pub fn stamp_radius(&self, n_sigma: f64) -> f64 {
        n_sigma * self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fwhm_sigma_relation() {
        let psf = GaussianPsf::from_fwhm(2.3548200450309493).unwrap();
        assert_relative_eq!(psf.sigma(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(psf.fwhm(), 2.3548200450309493, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_width() {
        assert!(GaussianPsf::from_fwhm(0.0).is_none());
        assert!(GaussianPsf::from_fwhm(-1.0).is_none());
        assert!(GaussianPsf::from_fwhm(f64::NAN).is_none());
    }

    #[test]
    fn test_fractions_sum_to_one() {
        let psf = GaussianPsf::from_fwhm(3.0).unwrap();
        let mut total = 0.0;
        for j in -20..=20 {
            for i in -20..=20 {
                total += psf.pixel_fraction(i as f64 + 0.3, j as f64 - 0.2);
            }
        }
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_symmetry_and_peak() {
        let psf = GaussianPsf::from_sigma(1.2).unwrap();
        let center = psf.pixel_fraction(0.0, 0.0);
        let right = psf.pixel_fraction(1.0, 0.0);
        assert_relative_eq!(right, psf.pixel_fraction(-1.0, 0.0), epsilon = 1e-7);
        assert_relative_eq!(right, psf.pixel_fraction(0.0, 1.0), epsilon = 1e-7);
        assert!(center > psf.pixel_fraction(1.0, 0.0));
        assert!(psf.pixel_fraction(1.0, 0.0) > psf.pixel_fraction(1.0, 1.0));
    }

    #[test]
    fn test_stamp_radius() {
        let psf = GaussianPsf::from_sigma(2.0).unwrap();
        assert_relative_eq!(psf.stamp_radius(3.0), 6.0);
    }
}
