//! Image dimensions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of a detector frame in pixels
///
/// Uses usize for direct compatibility with ndarray indexing. Arrays are
/// row-major, so the ndarray shape is `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelShape {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl PixelShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Both dimensions are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Shape as an ndarray `(rows, cols)` tuple
    pub fn ndarray_dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Center point as (x, y) float coordinates
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Whether a sub-pixel position lies on the frame or within `margin`
    /// pixels of its edge
    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= -margin
            && y >= -margin
            && x < self.width as f64 + margin
            && y < self.height as f64 + margin
    }
}

impl From<(usize, usize)> for PixelShape {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::new(dimensions.0, dimensions.1)
    }
}

impl fmt::Display for PixelShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
