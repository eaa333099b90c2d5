//! Model comparison (linear vs logarithmic) and predictor selection.
//!
//! - `compare_models` fits both kinds on the same training set and scores them
//!   by MAE / R². The logarithmic model is the production model; the
//!   comparison reports which kind actually scored the lower MAE.
//! - `Predictor` is what the dashboard predicts with: the fitted logarithmic
//!   model when the data allow it, else the product's fallback curve.

use crate::domain::{FallbackCurve, FitResult, FittedModel, ModelKind, ProductProfile, Sample};
use crate::error::ModelError;
use crate::fit::fitter::{fit, fit_with_quality};
use crate::models::{fallback, fallback_formula, formula};

/// Output of fitting both model kinds on one selection.
#[derive(Debug, Clone)]
pub struct ModelComparison {
    pub linear: FitResult,
    pub logarithmic: FitResult,
    /// Kind with the lower MAE (ties go to the logarithmic model).
    pub best: ModelKind,
    /// Product MAE limit for the production model.
    pub accuracy_limit: f64,
}

impl ModelComparison {
    /// Whether the production (logarithmic) model meets the accuracy criterion.
    pub fn meets_accuracy(&self) -> bool {
        self.logarithmic.quality.mae <= self.accuracy_limit
    }

    pub fn get(&self, kind: ModelKind) -> &FitResult {
        match kind {
            ModelKind::Linear => &self.linear,
            ModelKind::Logarithmic => &self.logarithmic,
        }
    }
}

/// Fit linear and logarithmic models and compare them.
pub fn compare_models(samples: &[Sample], profile: &ProductProfile) -> Result<ModelComparison, ModelError> {
    let linear = fit_with_quality(ModelKind::Linear, samples)?;
    let logarithmic = fit_with_quality(ModelKind::Logarithmic, samples)?;

    let best = if linear.quality.mae < logarithmic.quality.mae {
        ModelKind::Linear
    } else {
        ModelKind::Logarithmic
    };

    Ok(ModelComparison {
        linear,
        logarithmic,
        best,
        accuracy_limit: profile.accuracy_limit,
    })
}

/// The curve used for the dashboard prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictor {
    /// Logarithmic model fitted on the current selection.
    Fitted(FittedModel),
    /// Closed-form fallback, with the reason the fit was not possible.
    Theoretical { curve: FallbackCurve, reason: ModelError },
}

impl Predictor {
    /// Fit the selection, falling back to the product's theoretical curve once.
    pub fn for_samples(profile: &ProductProfile, samples: &[Sample]) -> Self {
        match fit(samples) {
            Ok(model) => Predictor::Fitted(model),
            Err(reason) => {
                tracing::info!(
                    product = profile.kind.display_name(),
                    %reason,
                    "using theoretical model"
                );
                Predictor::Theoretical {
                    curve: profile.fallback,
                    reason,
                }
            }
        }
    }

    pub fn predict(&self, t: f64) -> f64 {
        match self {
            Predictor::Fitted(model) => model.predict(t),
            Predictor::Theoretical { curve, .. } => fallback(*curve, t),
        }
    }

    pub fn is_theoretical(&self) -> bool {
        matches!(self, Predictor::Theoretical { .. })
    }

    pub fn fitted(&self) -> Option<&FittedModel> {
        match self {
            Predictor::Fitted(model) => Some(model),
            Predictor::Theoretical { .. } => None,
        }
    }

    pub fn formula(&self, label: &str) -> String {
        match self {
            Predictor::Fitted(m) => formula(m.kind, label, m.intercept, m.slope),
            Predictor::Theoretical { curve, .. } => fallback_formula(*curve, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AYRAN, IRIMSHIK};

    fn samples(f: impl Fn(f64) -> f64, times: &[f64]) -> Vec<Sample> {
        times.iter().map(|&t| Sample::new(t, f(t))).collect()
    }

    #[test]
    fn comparison_prefers_log_on_log_data() {
        let data = samples(|t| 5.98 - 0.7 * (t + 1.0).ln(), &[0.0, 0.5, 1.0, 2.0, 4.0, 6.0, 10.0]);
        let cmp = compare_models(&data, &AYRAN).unwrap();
        assert_eq!(cmp.best, ModelKind::Logarithmic);
        assert!(cmp.meets_accuracy());
        assert_eq!(cmp.get(ModelKind::Linear).model.kind, ModelKind::Linear);
    }

    #[test]
    fn comparison_prefers_linear_on_linear_data() {
        let data = samples(|t| 75.0 - 5.0 * t, &[0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 10.0]);
        let cmp = compare_models(&data, &IRIMSHIK).unwrap();
        assert_eq!(cmp.best, ModelKind::Linear);
    }

    #[test]
    fn comparison_needs_six_samples() {
        let data = samples(|t| 5.0 - t, &[0.0, 1.0, 2.0]);
        assert!(matches!(
            compare_models(&data, &AYRAN),
            Err(ModelError::InsufficientData(_))
        ));
    }

    #[test]
    fn predictor_falls_back_on_insufficient_data() {
        let few = samples(|t| 5.0 - t, &[0.0, 1.0]);

        let ayran = Predictor::for_samples(&AYRAN, &few);
        assert!(ayran.is_theoretical());
        assert!(ayran.fitted().is_none());
        assert!((ayran.predict(0.0) - 5.98).abs() < 1e-12);

        let irimshik = Predictor::for_samples(&IRIMSHIK, &[]);
        assert!((irimshik.predict(0.0) - 75.0).abs() < 1e-12);
        assert!((irimshik.predict(1000.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn predictor_uses_fit_when_possible() {
        let data = samples(|t| 6.0 - 0.5 * (t + 1.0).ln(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let p = Predictor::for_samples(&AYRAN, &data);
        assert!(!p.is_theoretical());
        assert!((p.predict(3.0) - (6.0 - 0.5 * 4.0_f64.ln())).abs() < 1e-9);
        assert!(p.formula("pH").contains("ln(t+1)"));
    }
}
