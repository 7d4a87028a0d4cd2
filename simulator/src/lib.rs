//! Simulated astronomical CCD image synthesis
//!
//! This crate turns a sky pointing, a telescope/sensor configuration and a
//! list of catalog point sources into a grid of detector counts (ADU), and
//! maps that grid to a bounded display range.
//!
//! The pipeline is:
//! 1. [`SimulatedSkyImage::new`] validates the [`SensorParams`] and builds a
//!    gnomonic [`Wcs`] for the field.
//! 2. A [`CatalogProvider`](starfield::CatalogProvider) supplies sources.
//! 3. [`SimulatedSkyImage::render`] composes background noise, Gaussian PSF
//!    stamps and gain/bias/ADU conversion.
//! 4. [`zscale_normalize`] rescales the counts for display.

pub mod hardware;
pub mod image_proc;
pub mod photometry;
pub mod wcs;

pub use hardware::sensor::SensorParams;
pub use image_proc::render::{
    quantize_image, BackgroundModel, RenderOptions, RenderingResult, SimulatedSkyImage,
    SourceInFrame,
};
pub use image_proc::zscale::{zscale_auto, zscale_normalize};
pub use photometry::{Photometry, ZeroPointPhotometry};
pub use starfield::{CatalogSource, Equatorial};
pub use wcs::{AffineParameters, AffineTransform, Wcs};

use shared::algo::StatsError;
use starfield::StarfieldError;
use thiserror::Error;

/// Raw detector counts, row-major `(height, width)`, bounded to `[0, max_adu]`
pub type DetectorImage = ndarray::Array2<u16>;

/// Errors produced while configuring or running a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// A parameter failed validation at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The coordinate has no tangent-plane image (on or behind the plane)
    #[error("projection degenerate for RA {ra_deg:.6}, Dec {dec_deg:.6}")]
    ProjectionDegenerate { ra_deg: f64, dec_deg: f64 },

    /// Propagated unchanged from the catalog provider
    #[error("catalog failure: {0}")]
    Catalog(#[from] StarfieldError),

    #[error("statistics failure: {0}")]
    Stats(#[from] StatsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulationError>;
