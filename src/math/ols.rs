//! Closed-form simple least squares.
//!
//! Every model in this project is linear in its two coefficients once the
//! regressor has been transformed, so we only ever solve
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! which has the closed-form solution
//!
//! ```text
//! b = Σ(x_i - x̄)(y_i - ȳ) / Σ(x_i - x̄)^2
//! a = ȳ - b x̄
//! ```

/// Intercept and slope of a simple linear regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

/// Solve simple OLS for paired `x`, `y`.
///
/// Returns `None` for empty/mismatched input or when `x` has no variance
/// (centered sum of squares below `f64::EPSILON`).
pub fn simple_least_squares(x: &[f64], y: &[f64]) -> Option<LineFit> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        sxx += dx * dx;
        sxy += dx * (yi - y_mean);
    }

    if !sxx.is_finite() || sxx < f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return None;
    }

    Some(LineFit { intercept, slope })
}
