//! Algorithms shared by the simulation pipeline
//!
//! - **parallel**: seeded row-chunk processing of 2D arrays with rayon
//! - **stats**: quickselect median, standard deviation and image summaries

pub mod parallel;
pub mod stats;

pub use parallel::{chunk_seed, process_array_in_parallel_chunks};
pub use stats::{fast_median, std_dev, ImageStats, StatsError};
