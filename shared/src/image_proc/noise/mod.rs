//! Noise processing module for detector simulation
//!
//! - **variates**: Poisson and Normal single-sample generators
//! - **generate**: whole-image noise planes built from those generators

pub mod generate;
pub mod variates;

pub use generate::{
    apply_poisson_photon_noise, generate_background_field, jittered_background_field,
    shared_background_scalar, BackgroundRates,
};
pub use variates::{normal_variate, poisson_variate};
