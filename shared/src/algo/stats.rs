//! Robust statistics over flattened pixel arrays
//!
//! The median is found with quickselect (`select_nth_unstable_by`) rather
//! than a full sort. Any pivot strategy yields the same order statistics, so
//! the result is identical to a sort-based median.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from statistics over empty or invalid data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No finite values to summarize
    #[error("insufficient data: {total} values, 0 valid")]
    Empty { total: usize },
}

fn finite_values<T: Copy + Into<f64>>(values: &[T]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| v.into())
        .filter(|v: &f64| v.is_finite())
        .collect()
}

/// Median of a mutable buffer, reordering it in place
///
/// Even lengths return the mean of the two central order statistics.
fn median_in_place(data: &mut [f64]) -> f64 {
    let len = data.len();
    let mid = len / 2;

    let (left, upper, _) = data.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let upper = *upper;
    if len % 2 == 1 {
        upper
    } else {
        // After selection every element left of `mid` is <= the upper median
        let lower = left.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lower + upper) / 2.0
    }
}

/// Median of a slice in expected linear time
///
/// Non-finite values are ignored. For an even number of values the two central
/// values are averaged.
///
/// # Errors
/// [`StatsError::Empty`] when no finite values remain.
pub fn fast_median<T: Copy + Into<f64>>(values: &[T]) -> Result<f64, StatsError> {
    let mut data = finite_values(values);
    if data.is_empty() {
        return Err(StatsError::Empty {
            total: values.len(),
        });
    }
    Ok(median_in_place(&mut data))
}

/// Population standard deviation (divides by N)
///
/// Two-pass: mean first, then mean squared deviation. Non-finite values are
/// ignored.
pub fn std_dev<T: Copy + Into<f64>>(values: &[T]) -> Result<f64, StatsError> {
    let data = finite_values(values);
    if data.is_empty() {
        return Err(StatsError::Empty {
            total: values.len(),
        });
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(variance.sqrt())
}

/// Summary statistics of an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    pub median: f64,
    pub std_dev: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ImageStats {
    /// Compute statistics over every finite pixel of a 2D image
    pub fn from_array<T: Copy + Into<f64>>(image: ArrayView2<T>) -> Result<Self, StatsError> {
        let flat: Vec<T> = image.iter().copied().collect();
        let mut data = finite_values(&flat);
        if data.is_empty() {
            return Err(StatsError::Empty { total: image.len() });
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let median = median_in_place(&mut data);

        Ok(Self {
            median,
            std_dev: variance.sqrt(),
            mean,
            min,
            max,
        })
    }
}
