//! Noise planes for detector simulation.
//!
//! Two background models are provided:
//! - [`generate_background_field`]: every pixel gets its own dark-current
//!   Poisson draw, read-noise Gaussian draw and sky Poisson draw.
//! - [`shared_background_scalar`] + [`jittered_background_field`]: a single
//!   noise scalar is drawn for the whole image and each pixel scales it by
//!   an independent uniform factor in [0, 1). Cheap and crude, kept for
//!   parity with older renders.
//!
//! Both parallelize over row chunks with
//! [`process_array_in_parallel_chunks`](crate::algo::process_array_in_parallel_chunks),
//! so a fixed seed gives identical output regardless of thread count.

use crate::algo::process_array_in_parallel_chunks;
use ndarray::Array2;
use rand::{thread_rng, Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::variates::{normal_variate, poisson_variate};

/// Above this mean the photon noise uses the Gaussian approximation
const POISSON_GAUSSIAN_CROSSOVER: f64 = 1.0e4;

/// Expected per-pixel background levels over one exposure
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BackgroundRates {
    /// Mean dark electrons per pixel
    pub dark_electrons: f64,
    /// Mean sky electrons per pixel
    pub sky_electrons: f64,
    /// Read noise RMS in electrons
    pub read_noise_e: f64,
}

impl BackgroundRates {
    /// Draw one background sample in electrons
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let dark = poisson_variate(rng, self.dark_electrons) as f64;
        let read = normal_variate(rng, 0.0, self.read_noise_e);
        let sky = poisson_variate(rng, self.sky_electrons) as f64;
        dark + read + sky
    }
}

fn resolve_seed(rng_seed: Option<u64>) -> u64 {
    rng_seed.unwrap_or_else(|| thread_rng().next_u64())
}

/// Generate an independent background sample for every pixel
///
/// # Arguments
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `rates` - Per-pixel dark, sky and read noise levels
/// * `rng_seed` - Optional seed for reproducibility
///
/// # Returns
/// Background electrons per pixel. Values may be negative where read noise
/// dominates; clamping happens at quantization.
pub fn generate_background_field(
    width: usize,
    height: usize,
    rates: &BackgroundRates,
    rng_seed: Option<u64>,
) -> Array2<f64> {
    let rates = *rates;
    process_array_in_parallel_chunks(
        Array2::<f64>::zeros((height, width)),
        resolve_seed(rng_seed),
        None,
        move |chunk, rng| {
            chunk.iter_mut().for_each(|pixel| *pixel = rates.sample(rng));
        },
    )
}

/// Draw the single background scalar used by the shared-scalar model
pub fn shared_background_scalar<R: Rng + ?Sized>(rng: &mut R, rates: &BackgroundRates) -> f64 {
    rates.sample(rng)
}

/// Broadcast a background scalar with per-pixel uniform jitter in [0, 1)
pub fn jittered_background_field(
    width: usize,
    height: usize,
    scalar: f64,
    rng_seed: Option<u64>,
) -> Array2<f64> {
    process_array_in_parallel_chunks(
        Array2::<f64>::zeros((height, width)),
        resolve_seed(rng_seed),
        None,
        move |chunk, rng| {
            chunk
                .iter_mut()
                .for_each(|pixel| *pixel = scalar * rng.gen::<f64>());
        },
    )
}

/// Apply Poisson arrival statistics to a mean electron image in parallel
///
/// Each pixel's value is treated as the mean of a Poisson distribution.
/// Non-positive means yield zero; very large means use the Gaussian
/// approximation.
///
/// # Arguments
/// * `mean_electron_image` - 2D array containing mean electron counts per pixel
/// * `rng_seed` - Optional seed for random number generator
pub fn apply_poisson_photon_noise(
    mean_electron_image: &Array2<f64>,
    rng_seed: Option<u64>,
) -> Array2<f64> {
    process_array_in_parallel_chunks(
        mean_electron_image.clone(),
        resolve_seed(rng_seed),
        None,
        |chunk, rng| {
            chunk.iter_mut().for_each(|pixel| {
                let mean_electrons = *pixel;
                *pixel = if !(mean_electrons > 0.0) {
                    0.0
                } else if mean_electrons < POISSON_GAUSSIAN_CROSSOVER {
                    poisson_variate(rng, mean_electrons) as f64
                } else {
                    normal_variate(rng, mean_electrons, mean_electrons.sqrt()).max(0.0)
                };
            });
        },
    )
}
