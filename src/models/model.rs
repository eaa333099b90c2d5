//! Model evaluation for the regression families and the fallback curves.
//!
//! The fitter relies on two primitive operations:
//! - map elapsed time to the regressor of a model kind (for OLS)
//! - predict y(t) given coefficients (for residuals/plots)
//!
//! The fallback curves are evaluated here too, so "trained" and "theoretical"
//! predictions share one entry point per shape.

use crate::domain::{FallbackCurve, ModelKind};
use crate::math::regressor;

/// Predict `y(t) = intercept + slope * x(t)` for the given model kind.
pub fn predict(kind: ModelKind, t: f64, intercept: f64, slope: f64) -> f64 {
    intercept + slope * regressor(kind, t)
}

/// Evaluate a closed-form fallback curve at `t` hours.
pub fn fallback(curve: FallbackCurve, t: f64) -> f64 {
    match curve {
        FallbackCurve::Acidification { start, rate } => start - rate * t.ln_1p(),
        FallbackCurve::Drying {
            equilibrium,
            initial,
            rate,
        } => equilibrium + (initial - equilibrium) * (-rate * t).exp(),
    }
}

/// Human-readable formula of a fitted model, e.g. `pH = 5.98 -0.700 · ln(t+1)`.
pub fn formula(kind: ModelKind, label: &str, intercept: f64, slope: f64) -> String {
    let sign = if slope >= 0.0 { "+" } else { "" };
    let term = match kind {
        ModelKind::Linear => "t",
        ModelKind::Logarithmic => "ln(t+1)",
    };
    format!("{label} = {intercept:.2} {sign}{slope:.3} · {term}")
}

/// Human-readable formula of a fallback curve.
pub fn fallback_formula(curve: FallbackCurve, label: &str) -> String {
    match curve {
        FallbackCurve::Acidification { start, rate } => {
            format!("{label} = {start:.2} - {rate:.2} · ln(t+1)")
        }
        FallbackCurve::Drying {
            equilibrium,
            initial,
            rate,
        } => format!(
            "{label} = {equilibrium:.1} + ({initial:.1} - {equilibrium:.1}) · exp(-{rate:.2} · t)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AYRAN, IRIMSHIK};

    #[test]
    fn predict_at_start_is_intercept() {
        for kind in [ModelKind::Linear, ModelKind::Logarithmic] {
            assert_eq!(predict(kind, 0.0, 5.5, -0.3), 5.5);
        }
    }

    #[test]
    fn acidification_fallback_matches_generator_constants() {
        assert_eq!(fallback(AYRAN.fallback, 0.0), 5.98);
        let at_5h = fallback(AYRAN.fallback, 5.0);
        assert!((at_5h - (5.98 - 0.7 * 6.0_f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn drying_fallback_starts_at_75_and_settles_at_18() {
        assert_eq!(fallback(IRIMSHIK.fallback, 0.0), 75.0);
        let late = fallback(IRIMSHIK.fallback, 200.0);
        assert!((late - 18.0).abs() < 1e-9);
        assert!(fallback(IRIMSHIK.fallback, 3.0) > fallback(IRIMSHIK.fallback, 4.0));
    }

    #[test]
    fn formula_shows_sign_of_slope() {
        assert_eq!(
            formula(ModelKind::Logarithmic, "pH", 5.98, -0.7),
            "pH = 5.98 -0.700 · ln(t+1)"
        );
        assert_eq!(formula(ModelKind::Linear, "Moisture", 70.0, 1.25), "Moisture = 70.00 +1.250 · t");
    }
}
