//! Measurement data: the loaded dataset, selections and the synthetic generator.

pub mod dataset;
pub mod generator;

pub use dataset::*;
pub use generator::*;
