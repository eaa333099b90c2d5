//! Regressor transforms.
//!
//! The logarithmic model regresses on `ln(t + 1)`. We evaluate it as
//! `ln_1p(t)`, which keeps full precision for the small elapsed times near
//! process start and gives exactly `0` at `t = 0`.

use crate::domain::ModelKind;

/// `ln(t + 1)`.
pub fn log_time(t: f64) -> f64 {
    t.ln_1p()
}

/// Inverse of [`log_time`]: `exp(x) - 1`.
pub fn log_time_inverse(x: f64) -> f64 {
    x.exp_m1()
}

/// Map elapsed time to the regressor of the given model kind.
pub fn regressor(kind: ModelKind, t: f64) -> f64 {
    match kind {
        ModelKind::Linear => t,
        ModelKind::Logarithmic => log_time(t),
    }
}

/// Map a regressor value back to elapsed time.
pub fn regressor_inverse(kind: ModelKind, x: f64) -> f64 {
    match kind {
        ModelKind::Linear => x,
        ModelKind::Logarithmic => log_time_inverse(x),
    }
}
