//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - product lookup tables (`ProductKind`, `ProductProfile`)
//! - training observations (`Sample`)
//! - fit outputs (`FittedModel`, `FitResult`, etc.)

pub mod types;

pub use types::*;
