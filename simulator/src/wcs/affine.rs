//! Six-parameter 2D affine transform
//!
//! `[x'; y'] = [[A, B], [C, D]] · [x; y] + [E; F]`
//!
//! In the WCS the input is a pixel offset from the reference pixel and the
//! output is a tangent-plane position in degrees; E and F are the
//! tangent-plane offset of the reference pixel, normally zero.

use serde::{Deserialize, Serialize};

use crate::{Result, SimulationError};

/// Relative determinant below which the linear part is treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Raw affine coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineParameters {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Linear part from per-axis increments and a rotation, FITS style
    ///
    /// Follows the CDELTi/CROTA2 to CD matrix convention:
    /// `CD1_1 = cdelt1·cosρ`, `CD1_2 = −cdelt2·sinρ`,
    /// `CD2_1 = cdelt1·sinρ`, `CD2_2 = cdelt2·cosρ`.
    pub fn from_cdelt_crota(cdelt1: f64, cdelt2: f64, crota_deg: f64) -> Self {
        let (sin_r, cos_r) = crota_deg.to_radians().sin_cos();
        Self {
            a: cdelt1 * cos_r,
            b: -cdelt2 * sin_r,
            c: cdelt1 * sin_r,
            d: cdelt2 * cos_r,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }
}

/// Validated, invertible affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    params: AffineParameters,
    /// Inverse of the linear part, row-major
    inverse: [f64; 4],
}

impl AffineTransform {
    /// Build a transform, rejecting non-finite or singular coefficients
    pub fn new(params: AffineParameters) -> Result<Self> {
        let AffineParameters { a, b, c, d, e, f } = params;
        if ![a, b, c, d, e, f].iter().all(|v| v.is_finite()) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "affine parameters must be finite: {params:?}"
            )));
        }

        let det = params.determinant();
        let norm = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
        if norm == 0.0 || det.abs() <= SINGULAR_TOLERANCE * norm * norm {
            return Err(SimulationError::InvalidConfiguration(format!(
                "affine matrix is not invertible (determinant {det:e})"
            )));
        }

        Ok(Self {
            params,
            inverse: [d / det, -b / det, -c / det, a / det],
        })
    }

    pub fn params(&self) -> &AffineParameters {
        &self.params
    }

    pub fn determinant(&self) -> f64 {
        self.params.determinant()
    }

    /// Forward map
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let p = &self.params;
        (p.a * x + p.b * y + p.e, p.c * x + p.d * y + p.f)
    }

    /// Inverse map, exact up to rounding
    pub fn apply_inverse(&self, u: f64, v: f64) -> (f64, f64) {
        let du = u - self.params.e;
        let dv = v - self.params.f;
        let [ia, ib, ic, id] = self.inverse;
        (ia * du + ib * dv, ic * du + id * dv)
    }
}
