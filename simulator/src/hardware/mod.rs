//! Hardware module for the combined telescope + sensor configuration

pub mod sensor;

pub use sensor::{models, SensorParams};
