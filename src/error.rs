//! Error types.
//!
//! - `ModelError` is the recoverable error surface of the fit engine. Callers
//!   decide what to do with it (fallback curve, user-visible message).
//! - `AppError` is the boundary error: a message plus the process exit code.

use thiserror::Error;

/// Why a training set cannot support a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Shortfall {
    /// Fewer valid samples than the minimum population size.
    #[error("{valid} valid samples, at least {required} required")]
    TooFewSamples { valid: usize, required: usize },
    /// Every sample shares the same elapsed time, so the regressor has no spread.
    #[error("all {valid} samples share the same elapsed time")]
    NoTimeSpread { valid: usize },
}

/// Recoverable fit/inversion failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The training set cannot produce a meaningful fit; use the fallback curve.
    #[error("insufficient data: {0}")]
    InsufficientData(Shortfall),

    /// The fitted slope is too close to zero to invert for time: either below
    /// the tolerance, or so shallow the solved time is not finite.
    #[error("no time dependence: slope {slope:.6} is too flat to invert (tolerance {tolerance})")]
    NoTimeDependence { slope: f64, tolerance: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
