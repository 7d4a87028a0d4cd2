//! Image synthesis and display processing

pub mod io;
pub mod psf;
pub mod render;
pub mod zscale;

pub use psf::GaussianPsf;
pub use render::{
    quantize_image, BackgroundModel, RenderOptions, RenderingResult, SimulatedSkyImage,
    SourceInFrame,
};
pub use zscale::{zscale_auto, zscale_normalize};
