//! Shared components and utilities for the sky simulation crates.
//!
//! This crate contains the numeric building blocks that do not depend on a
//! particular sensor or optics model: random-variate generation for noise,
//! deterministic parallel chunk processing and robust image statistics.

pub mod algo;
pub mod image_proc;
pub mod image_size;
