//! Equatorial (RA/Dec) coordinate primitive

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Result, StarfieldError};

/// A position on the celestial sphere in degrees
///
/// Right ascension lies in [0, 360) and declination in [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    /// Right ascension in degrees
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_ra_deg(ra_deg: f64) -> f64 {
    let wrapped = ra_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

impl Equatorial {
    /// Create a validated coordinate
    ///
    /// RA is wrapped into [0, 360); declination outside [-90, 90] or any
    /// non-finite component is rejected.
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() {
            return Err(StarfieldError::InvalidCoordinate(format!(
                "non-finite coordinate ({ra_deg}, {dec_deg})"
            )));
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(StarfieldError::InvalidCoordinate(format!(
                "declination {dec_deg} outside [-90, 90]"
            )));
        }
        Ok(Self {
            ra_deg: normalize_ra_deg(ra_deg),
            dec_deg,
        })
    }

    /// Build a coordinate by wrapping RA and clamping Dec, never failing
    ///
    /// Intended for values produced by trigonometry where tiny excursions
    /// past the poles come from rounding.
    pub fn from_degrees_normalized(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_deg: normalize_ra_deg(ra_deg),
            dec_deg: dec_deg.clamp(-90.0, 90.0),
        }
    }

    /// Right ascension in radians
    pub fn ra_rad(&self) -> f64 {
        self.ra_deg.to_radians()
    }

    /// Declination in radians
    pub fn dec_rad(&self) -> f64 {
        self.dec_deg.to_radians()
    }

    /// Great-circle distance to another coordinate in degrees (haversine)
    pub fn angular_separation_deg(&self, other: &Equatorial) -> f64 {
        let dec1 = self.dec_rad();
        let dec2 = other.dec_rad();
        let d_ra = other.ra_rad() - self.ra_rad();
        let d_dec = dec2 - dec1;

        let a = (d_dec / 2.0).sin().powi(2) + dec1.cos() * dec2.cos() * (d_ra / 2.0).sin().powi(2);
        (2.0 * a.sqrt().min(1.0).asin()).to_degrees()
    }
}

impl fmt::Display for Equatorial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RA {:.6}°, Dec {:+.6}°", self.ra_deg, self.dec_deg)
    }
}
