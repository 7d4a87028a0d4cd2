//! Image I/O for detector frames
//!
//! Frames are written as 16-bit grayscale PNG. Row 0 of the array is the
//! top row of the file.

use image::{ImageBuffer, Luma};
use ndarray::Array2;
use starfield::Equatorial;
use std::path::Path;

use crate::{Result, SimulationError};

/// Save a u16 image as a 16-bit grayscale PNG
///
/// # Arguments
/// * `image` - 2D array, shape `(height, width)`
/// * `path` - Output path; the format follows the extension
pub fn save_u16_png<P: AsRef<Path>>(image: &Array2<u16>, path: P) -> Result<()> {
    let (height, width) = image.dim();
    let img_buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            Luma([image[[y as usize, x as usize]]])
        });
    img_buffer.save(path)?;
    Ok(())
}

/// Load a grayscale image as u16, widening 8-bit data
pub fn load_u16_image<P: AsRef<Path>>(path: P) -> Result<Array2<u16>> {
    let img = image::open(path)?.into_luma16();
    let (width, height) = img.dimensions();
    let shape = (height as usize, width as usize);
    Array2::from_shape_vec(shape, img.into_raw()).map_err(|e| {
        SimulationError::InvalidConfiguration(format!("image buffer has unexpected shape: {e}"))
    })
}

/// Split a non-negative quantity in units into (units, minutes, seconds),
/// rounding to the nearest whole second
fn sexagesimal(value: f64) -> (u64, u64, u64) {
    let total = (value * 3600.0).round() as u64;
    (total / 3600, (total / 60) % 60, total % 60)
}

/// Build a file stem from a prefix and a pointing
///
/// RA is written as hours and Dec as signed degrees, e.g.
/// `field_10h00m00s_+20d00m00s`.
pub fn output_filename(prefix: &str, pointing: &Equatorial) -> String {
    let (h, m, s) = sexagesimal(pointing.ra_deg / 15.0);
    let h = h % 24;
    let sign = if pointing.dec_deg < 0.0 { '-' } else { '+' };
    let (d, dm, ds) = sexagesimal(pointing.dec_deg.abs());
    format!("{prefix}_{h:02}h{m:02}m{s:02}s_{sign}{d:02}d{dm:02}m{ds:02}s")
}
