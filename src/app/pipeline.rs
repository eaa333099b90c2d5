//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> selection -> predictor -> prediction + status -> model
//! comparison -> optimizer -> SCADA snapshot
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::ops::RangeInclusive;

use crate::data::{Dataset, Selection};
use crate::domain::{DashboardConfig, FittedModel, ProductKind, ProductProfile, QualityStatus, Sample, SampleResidual};
use crate::error::{AppError, ModelError};
use crate::fit::{ModelComparison, Predictor, compare_models, compute_residuals, default_target, fit, prediction_grid, solve_time_for_target};
use crate::io::{load_dataset, resolve_data_path};
use crate::quality::classify;
use crate::report::{JournalTable, KpiCard, kpi_cards, process_journal};
use crate::scada::{ScadaSnapshot, snapshot};

/// Prediction slider range (hours).
pub const PREDICTION_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// Optimizer plot horizon (hours) and resolution.
pub const OPTIMIZER_HORIZON_H: f64 = 12.0;
pub const OPTIMIZER_GRID_POINTS: usize = 100;

/// Resolve the dataset path and load it.
pub fn load(config: &DashboardConfig) -> Result<Dataset, AppError> {
    let path = resolve_data_path(config.data_path.as_deref())?;
    load_dataset(&path)
}

/// Requested product, or the dataset default.
pub fn resolve_product(dataset: &Dataset, requested: Option<&str>) -> Result<String, AppError> {
    match requested {
        Some(p) => Ok(p.to_string()),
        None => dataset
            .default_product()
            .ok_or_else(|| AppError::new(2, format!("Dataset '{}' has no product rows.", dataset.source.display()))),
    }
}

/// Select the configured product/experiment.
pub fn select<'a>(dataset: &'a Dataset, config: &DashboardConfig) -> Result<Selection<'a>, AppError> {
    let product = resolve_product(dataset, config.product.as_deref())?;
    dataset.select(&product, config.experiment.as_deref())
}

/// Quality prediction at one process time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub time_hours: f64,
    pub value: f64,
    pub status: QualityStatus,
}

/// Predict and classify at `t` hours.
pub fn predict_at(predictor: &Predictor, product: ProductKind, t: f64) -> Result<Prediction, AppError> {
    if !PREDICTION_RANGE.contains(&t) {
        return Err(AppError::new(
            2,
            format!(
                "Prediction time must be in [{}, {}] h (got {t}).",
                PREDICTION_RANGE.start(),
                PREDICTION_RANGE.end()
            ),
        ));
    }
    let value = predictor.predict(t);
    Ok(Prediction {
        time_hours: t,
        value,
        status: classify(product, value, t),
    })
}

/// Inverse-solve result for the optimizer view.
#[derive(Debug, Clone)]
pub struct Optimization {
    pub model: FittedModel,
    pub target: f64,
    /// Observed `[min, max]` of the quality column.
    pub observed: (f64, f64),
    /// `Err(NoTimeDependence)` when the model is flat in time.
    pub time_hours: Result<f64, ModelError>,
    pub grid: Vec<(f64, f64)>,
}

/// Solve for the time at which the selection's fitted model reaches `target`.
///
/// Needs a fitted model (no fallback). The target defaults to the product goal
/// clamped to the observed range; an explicit target outside it is rejected.
pub fn optimize(samples: &[Sample], profile: &ProductProfile, target: Option<f64>) -> Result<Optimization, AppError> {
    let model = fit(samples)?;

    let observed = samples
        .iter()
        .filter(|s| s.is_valid())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s.value), hi.max(s.value)));

    let target = match target {
        None => default_target(profile.goal, observed.0, observed.1),
        Some(t) if t.is_finite() && (observed.0..=observed.1).contains(&t) => t,
        Some(t) => {
            return Err(AppError::new(
                2,
                format!(
                    "Target {} {t} is outside the observed range [{:.2}, {:.2}].",
                    profile.target_label, observed.0, observed.1
                ),
            ));
        }
    };

    let time_hours = solve_time_for_target(&model, target);
    if let Err(err) = &time_hours {
        tracing::info!(%err, "optimizer cannot invert model");
    }

    Ok(Optimization {
        model,
        target,
        observed,
        time_hours,
        grid: prediction_grid(&model, 0.0, OPTIMIZER_HORIZON_H, OPTIMIZER_GRID_POINTS),
    })
}

/// All computed outputs of one dashboard run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub product: String,
    pub kind: ProductKind,
    pub experiment: Option<String>,
    pub n_points: usize,
    pub samples: Vec<Sample>,
    pub kpis: Vec<KpiCard>,
    pub journal: JournalTable,
    pub predictor: Predictor,
    pub prediction: Prediction,
    pub comparison: Result<ModelComparison, ModelError>,
    pub optimization: Result<Optimization, AppError>,
    /// Per-sample fitted values; empty under the theoretical model.
    pub residuals: Vec<SampleResidual>,
    pub scada: ScadaSnapshot,
    /// Longest observed duration of the selection (hours).
    pub max_duration: Option<f64>,
}

impl RunOutput {
    pub fn profile(&self) -> &'static ProductProfile {
        self.kind.profile()
    }
}

/// Execute the full dashboard pipeline on a loaded dataset.
pub fn run_dashboard(dataset: &Dataset, config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let selection = select(dataset, config)?;
    let profile = selection.kind.profile();
    let samples = selection.quality_samples();

    tracing::debug!(
        product = %selection.product,
        experiment = selection.experiment.as_deref().unwrap_or("all"),
        rows = selection.len(),
        samples = samples.len(),
        "selection"
    );

    let predictor = Predictor::for_samples(profile, &samples);
    let prediction = predict_at(&predictor, selection.kind, config.time_hours)?;
    let residuals = predictor
        .fitted()
        .map(|m| compute_residuals(m, &samples))
        .unwrap_or_default();

    Ok(RunOutput {
        product: selection.product.clone(),
        kind: selection.kind,
        experiment: selection.experiment.clone(),
        n_points: selection.len(),
        kpis: kpi_cards(&selection, profile),
        journal: process_journal(dataset, &selection),
        comparison: compare_models(&samples, profile),
        optimization: optimize(&samples, profile, config.target),
        scada: snapshot(&selection, config.time_hours),
        max_duration: selection.max_duration(),
        samples,
        predictor,
        prediction,
        residuals,
    })
}
