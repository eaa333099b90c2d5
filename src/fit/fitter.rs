//! Low-level fitting routines for a single model kind.
//!
//! Given samples `(t_i, y_i)` we:
//! - drop invalid samples (non-finite values, negative time)
//! - transform `t_i` to the model's regressor (`t` or `ln(t + 1)`)
//! - solve simple OLS for `(intercept, slope)`
//!
//! Failures are reported as `ModelError::InsufficientData` so the caller can
//! switch to the product's fallback curve.

use crate::domain::{
    FitQuality, FitResult, FittedModel, MIN_FIT_SAMPLES, ModelKind, Sample, SampleResidual,
};
use crate::error::{ModelError, Shortfall};
use crate::math::{regressor, simple_least_squares};

/// Fit the production model `y = a + b * ln(t + 1)`.
pub fn fit(samples: &[Sample]) -> Result<FittedModel, ModelError> {
    fit_model(ModelKind::Logarithmic, samples)
}

/// Fit a single model kind.
pub fn fit_model(kind: ModelKind, samples: &[Sample]) -> Result<FittedModel, ModelError> {
    let (x, y): (Vec<f64>, Vec<f64>) = samples
        .iter()
        .filter(|s| s.is_valid())
        .map(|s| (regressor(kind, s.elapsed), s.value))
        .unzip();

    let valid = x.len();
    if valid < MIN_FIT_SAMPLES {
        return Err(ModelError::InsufficientData(Shortfall::TooFewSamples {
            valid,
            required: MIN_FIT_SAMPLES,
        }));
    }

    let line = simple_least_squares(&x, &y)
        .ok_or(ModelError::InsufficientData(Shortfall::NoTimeSpread { valid }))?;

    tracing::debug!(
        kind = kind.display_name(),
        n = valid,
        intercept = line.intercept,
        slope = line.slope,
        "fitted model"
    );

    Ok(FittedModel {
        kind,
        intercept: line.intercept,
        slope: line.slope,
    })
}

/// Fit a model kind and score it on its own training set.
pub fn fit_with_quality(kind: ModelKind, samples: &[Sample]) -> Result<FitResult, ModelError> {
    let model = fit_model(kind, samples)?;
    let quality = evaluate_fit(&model, samples);
    Ok(FitResult { model, quality })
}

/// MAE / RMSE / R² of a model over the valid samples.
///
/// R² follows the usual convention for a constant target: `1.0` when the
/// predictions are exact, `0.0` otherwise.
pub fn evaluate_fit(model: &FittedModel, samples: &[Sample]) -> FitQuality {
    let residuals = compute_residuals(model, samples);
    let n = residuals.len();
    if n == 0 {
        return FitQuality {
            mae: 0.0,
            rmse: 0.0,
            r2: 0.0,
            n: 0,
        };
    }

    let n_f = n as f64;
    let y_mean = residuals.iter().map(|r| r.sample.value).sum::<f64>() / n_f;

    let mut abs_sum = 0.0;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for r in &residuals {
        abs_sum += r.residual.abs();
        ss_res += r.residual * r.residual;
        let d = r.sample.value - y_mean;
        ss_tot += d * d;
    }

    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    FitQuality {
        mae: abs_sum / n_f,
        rmse: (ss_res / n_f).sqrt(),
        r2,
        n,
    }
}

/// Fitted values and residuals (`observed - fitted`) for each valid sample.
pub fn compute_residuals(model: &FittedModel, samples: &[Sample]) -> Vec<SampleResidual> {
    samples
        .iter()
        .filter(|s| s.is_valid())
        .map(|&sample| {
            let fitted = model.predict(sample.elapsed);
            SampleResidual {
                sample,
                fitted,
                residual: sample.value - fitted,
            }
        })
        .collect()
}
