//! Image-level processing shared across crates
//!
//! - **noise**: random-variate generators and detector noise planes

pub mod noise;

pub use noise::{
    apply_poisson_photon_noise, generate_background_field, jittered_background_field,
    normal_variate, poisson_variate, shared_background_scalar, BackgroundRates,
};
