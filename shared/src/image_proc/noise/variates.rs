//! Random-variate generators for shot noise and read noise
//!
//! Both generators take the random source as an argument. Nothing here
//! holds global state, so parallel workers can each own a seeded `StdRng`.

use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

/// Draw a Poisson distributed count with mean `lambda`
///
/// Returns 0 for `lambda <= 0` and for non-finite `lambda`.
pub fn poisson_variate<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if !(lambda > 0.0) || !lambda.is_finite() {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => {
            let sample: f64 = dist.sample(rng);
            sample as u64
        }
        Err(_) => 0,
    }
}

/// Draw a Gaussian sample with the given mean and standard deviation
///
/// Uses the ziggurat sampler from `rand_distr`. A zero, negative or NaN
/// `std_dev` degenerates to returning `mean`.
pub fn normal_variate<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev > 0.0) {
        return mean;
    }
    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}
