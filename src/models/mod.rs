//! Regression and fallback model implementations.
//!
//! Models are implemented as small, pure functions so that fitting and
//! reporting code can stay generic.

pub mod model;

pub use model::*;
