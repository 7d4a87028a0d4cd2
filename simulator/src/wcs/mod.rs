//! World Coordinate System: pixel ↔ equatorial mapping
//!
//! A [`Wcs`] anchors a gnomonic (TAN) projection at a reference pixel and a
//! reference sky coordinate. Pixel offsets go through an [`AffineTransform`]
//! to tangent-plane standard coordinates (ξ, η) in degrees, which are then
//! deprojected onto the sphere.
//!
//! Reference: Calabretta & Greisen (2002), FITS WCS Paper II, §5.1.3.

mod affine;

pub use affine::{AffineParameters, AffineTransform};

use starfield::Equatorial;

use crate::{Result, SimulationError};

/// Tangent-plane radius (radians) treated as the reference point itself
const RHO_EPSILON: f64 = 1e-15;

/// Points with cos(c) at or below this are on or behind the tangent plane
const HORIZON_EPSILON: f64 = 1e-12;

/// Spherical projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Gnomonic / TAN
    Gnomonic,
}

/// Bidirectional pixel ↔ sky mapping for one field
///
/// Immutable once built. Pixel centers sit at integer coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Wcs {
    reference_pixel: (f64, f64),
    reference: Equatorial,
    projection: Projection,
    transform: AffineTransform,
}

impl Wcs {
    /// Build a TAN projection
    ///
    /// # Arguments
    /// * `reference_pixel` - Pixel (x, y) that maps onto `reference`
    /// * `reference` - Tangent point on the sky
    /// * `transform` - Pixel offset → (ξ, η) in degrees
    pub fn tan(
        reference_pixel: (f64, f64),
        reference: Equatorial,
        transform: AffineTransform,
    ) -> Result<Self> {
        if !reference_pixel.0.is_finite() || !reference_pixel.1.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "reference pixel must be finite: {reference_pixel:?}"
            )));
        }
        Ok(Self {
            reference_pixel,
            reference,
            projection: Projection::Gnomonic,
            transform,
        })
    }

    pub fn reference_pixel(&self) -> (f64, f64) {
        self.reference_pixel
    }

    pub fn reference(&self) -> Equatorial {
        self.reference
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Map a pixel position to the sky
    ///
    /// Never fails; far from the tangent point accuracy degrades.
    pub fn pixel_to_equatorial(&self, px: f64, py: f64) -> Equatorial {
        let dx = px - self.reference_pixel.0;
        let dy = py - self.reference_pixel.1;
        let (xi_deg, eta_deg) = self.transform.apply(dx, dy);
        let xi = xi_deg.to_radians();
        let eta = eta_deg.to_radians();

        let rho = xi.hypot(eta);
        if rho < RHO_EPSILON {
            return self.reference;
        }

        let (sin_dec0, cos_dec0) = self.reference.dec_rad().sin_cos();
        let c = rho.atan();
        let (sin_c, cos_c) = c.sin_cos();

        let sin_dec = (cos_c * sin_dec0 + eta * sin_c * cos_dec0 / rho).clamp(-1.0, 1.0);
        let dec = sin_dec.asin();
        let ra = self.reference.ra_rad()
            + (xi * sin_c).atan2(rho * cos_dec0 * cos_c - eta * sin_dec0 * sin_c);

        Equatorial::from_degrees_normalized(ra.to_degrees(), dec.to_degrees())
    }

    /// Map a sky position to pixel coordinates
    ///
    /// # Errors
    /// [`SimulationError::ProjectionDegenerate`] when the point is on or
    /// behind the tangent plane (90° or more from the reference).
    pub fn equatorial_to_pixel(&self, coord: &Equatorial) -> Result<(f64, f64)> {
        let (sin_dec, cos_dec) = coord.dec_rad().sin_cos();
        let (sin_dec0, cos_dec0) = self.reference.dec_rad().sin_cos();
        let (sin_da, cos_da) = (coord.ra_rad() - self.reference.ra_rad()).sin_cos();

        let cos_c = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_da;
        if cos_c <= HORIZON_EPSILON {
            return Err(SimulationError::ProjectionDegenerate {
                ra_deg: coord.ra_deg,
                dec_deg: coord.dec_deg,
            });
        }

        let xi = (cos_dec * sin_da / cos_c).to_degrees();
        let eta = ((sin_dec * cos_dec0 - cos_dec * sin_dec0 * cos_da) / cos_c).to_degrees();

        let (dx, dy) = self.transform.apply_inverse(xi, eta);
        Ok((self.reference_pixel.0 + dx, self.reference_pixel.1 + dy))
    }
}
