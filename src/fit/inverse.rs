//! Inverse solve: the elapsed time at which a fitted model reaches a target.
//!
//! For `y = a + b * x(t)` the inversion is `t = x⁻¹((target - a) / b)`, i.e.
//! `exp((target - a) / b) - 1` for the logarithmic model. Negative solutions
//! mean the target is already met at process start and are reported as `0`.

use crate::domain::{FittedModel, SLOPE_TOLERANCE};
use crate::error::ModelError;
use crate::math::regressor_inverse;

/// Solve `model(t) = target` for `t ≥ 0`.
///
/// A slope of exactly `SLOPE_TOLERANCE` is accepted; only slopes strictly
/// below it count as flat.
pub fn solve_time_for_target(model: &FittedModel, target: f64) -> Result<f64, ModelError> {
    let flat = ModelError::NoTimeDependence {
        slope: model.slope,
        tolerance: SLOPE_TOLERANCE,
    };
    // Written as a negated `>=` so a NaN slope is rejected too.
    if !(model.slope.abs() >= SLOPE_TOLERANCE) {
        return Err(flat);
    }

    let x = (target - model.intercept) / model.slope;
    let t = regressor_inverse(model.kind, x);
    // A slope just above the tolerance can still push `exp_m1` past f64 range.
    if !t.is_finite() {
        return Err(flat);
    }
    Ok(t.max(0.0))
}

/// Default optimizer target: the product goal clamped into the observed range.
pub fn default_target(goal: f64, observed_min: f64, observed_max: f64) -> f64 {
    if observed_min > observed_max {
        return goal;
    }
    goal.clamp(observed_min, observed_max)
}

/// Evenly spaced `(t, model(t))` points over `[t0, t1]`.
pub fn prediction_grid(model: &FittedModel, t0: f64, t1: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let t = t0 + u * (t1 - t0);
            (t, model.predict(t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn log_model(a: f64, b: f64) -> FittedModel {
        FittedModel {
            kind: ModelKind::Logarithmic,
            intercept: a,
            slope: b,
        }
    }

    #[test]
    fn solve_inverts_predict() {
        let model = log_model(5.98, -0.7);
        for &t in &[0.0, 0.25, 1.0, 5.0, 9.5] {
            let y = model.predict(t);
            let back = solve_time_for_target(&model, y).unwrap();
            assert!((back - t).abs() < 1e-9, "t={t} back={back}");
        }
    }

    #[test]
    fn solve_for_ph_goal() {
        // 4.6 = 5.98 - 0.7 ln(t+1)  =>  t = exp(1.38/0.7) - 1
        let t = solve_time_for_target(&log_model(5.98, -0.7), 4.6).unwrap();
        assert!((t - ((1.38_f64 / 0.7).exp() - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn targets_met_at_start_clamp_to_zero() {
        // Falling curve starting at 5.98: a target above the start is "already reached".
        let t = solve_time_for_target(&log_model(5.98, -0.7), 6.5).unwrap();
        assert_eq!(t, 0.0);
    }

    #[test]
    fn flat_models_cannot_be_inverted() {
        let err = solve_time_for_target(&log_model(4.5, 0.0005), 4.0).unwrap_err();
        assert!(matches!(err, ModelError::NoTimeDependence { .. }));
        let err = solve_time_for_target(&log_model(4.5, f64::NAN), 4.0).unwrap_err();
        assert!(matches!(err, ModelError::NoTimeDependence { .. }));
    }

    #[test]
    fn shallow_slopes_that_overflow_are_flat() {
        // (4.6 - 5.98) / -0.0015 = 920, far past the range of exp.
        let err = solve_time_for_target(&log_model(5.98, -0.0015), 4.6).unwrap_err();
        assert!(matches!(err, ModelError::NoTimeDependence { .. }));
    }

    #[test]
    fn slope_at_tolerance_is_invertible() {
        let model = log_model(4.5, -SLOPE_TOLERANCE);
        let t = solve_time_for_target(&model, 4.499).unwrap();
        assert!((t - (1.0_f64.exp() - 1.0)).abs() < 1e-6, "t={t}");
        assert!(solve_time_for_target(&log_model(4.5, -0.999 * SLOPE_TOLERANCE), 4.499).is_err());
    }

    #[test]
    fn linear_models_invert_linearly() {
        let model = FittedModel {
            kind: ModelKind::Linear,
            intercept: 75.0,
            slope: -5.0,
        };
        assert!((solve_time_for_target(&model, 50.0).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn default_target_clamps_goal() {
        assert_eq!(default_target(4.6, 4.2, 6.0), 4.6);
        assert_eq!(default_target(18.0, 25.0, 75.0), 25.0);
        assert_eq!(default_target(4.6, 4.7, 6.0), 4.7);
        assert_eq!(default_target(4.6, 3.0, 4.0), 4.0);
    }

    #[test]
    fn grid_spans_interval() {
        let grid = prediction_grid(&log_model(5.0, -0.5), 0.0, 12.0, 100);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], (0.0, 5.0));
        assert!((grid[99].0 - 12.0).abs() < 1e-12);
    }
}
