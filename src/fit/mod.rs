//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit linear / logarithmic models by closed-form OLS (`fitter`)
//! - invert a fitted model for the time a target is reached (`inverse`)
//! - compare model kinds and pick the predictor, falling back to the
//!   theoretical curve when the data cannot support a fit (`selection`)

pub mod fitter;
pub mod inverse;
pub mod selection;

pub use fitter::*;
pub use inverse::*;
pub use selection::*;
