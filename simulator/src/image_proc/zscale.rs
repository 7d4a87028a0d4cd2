//! Zscale-style display normalization
//!
//! Clips an image to `median ± scale_factor · std_dev` and linearly rescales
//! the window onto `[0, max_display]`.

use ndarray::{Array2, ArrayView2};
use shared::algo::{ImageStats, StatsError};

/// Display window `(vmin, vmax)` for the given statistics
///
/// `vmin = max(0, median - k·σ)`, `vmax = min(max_display, median + k·σ)`.
/// A collapsed window is widened to `vmin + 1`.
pub fn zscale_limits(
    median: f64,
    std_dev: f64,
    scale_factor: f64,
    max_display: u16,
) -> (f64, f64) {
    let spread = std_dev * scale_factor;
    let vmin = (median - spread).max(0.0);
    let mut vmax = (median + spread).min(max_display as f64);
    if !(vmax > vmin) {
        vmax = vmin + 1.0;
    }
    (vmin, vmax)
}

/// Clip and rescale an image to `[0, max_display]`
///
/// Pure function of its arguments.
///
/// # Arguments
/// * `image` - Raw counts
/// * `median` - Image median
/// * `std_dev` - Image standard deviation
/// * `scale_factor` - Window half-width in standard deviations
/// * `max_display` - Top of the output range
pub fn zscale_normalize<T: Copy + Into<f64>>(
    image: ArrayView2<T>,
    median: f64,
    std_dev: f64,
    scale_factor: f64,
    max_display: u16,
) -> Array2<u16> {
    let (vmin, vmax) = zscale_limits(median, std_dev, scale_factor, max_display);
    let out_max = max_display as f64;
    let range = vmax - vmin;

    image.mapv(|value| {
        let value: f64 = value.into();
        let clipped = value.clamp(vmin, vmax);
        ((clipped - vmin) / range * out_max).round().clamp(0.0, out_max) as u16
    })
}

/// Normalize using the image's own median and standard deviation
pub fn zscale_auto<T: Copy + Into<f64>>(
    image: ArrayView2<T>,
    scale_factor: f64,
    max_display: u16,
) -> Result<Array2<u16>, StatsError> {
    let stats = ImageStats::from_array(image)?;
    Ok(zscale_normalize(
        image,
        stats.median,
        stats.std_dev,
        scale_factor,
        max_display,
    ))
}
