//! Mathematical utilities: regressor transforms and closed-form least squares.

pub mod ols;
pub mod transform;

pub use ols::*;
pub use transform::*;
