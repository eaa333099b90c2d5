//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Minimum number of valid samples for a regression fit.
pub const MIN_FIT_SAMPLES: usize = 6;

/// Below this absolute slope the fitted curve is treated as flat in time.
pub const SLOPE_TOLERANCE: f64 = 0.001;

/// Column holding elapsed process time (hours).
pub const DURATION_COLUMN: &str = "duration_hours";

/// Product column names, in lookup priority order.
pub const PRODUCT_COLUMNS: [&str; 2] = ["productname", "product_name"];

pub const EXPERIMENT_COLUMN: &str = "experiment_type";
pub const STAGE_COLUMN: &str = "process_stage";

/// The 14 controlled variables of the process state vector.
pub const STATE_VECTOR: [&str; 14] = [
    "Temperature (°C)",
    "pH",
    "Acidity (°T)",
    "ORP (mV)",
    "Viscosity (mPa·s)",
    "Density (kg/m³)",
    "Water activity (aw)",
    "Fat (%)",
    "Protein (%)",
    "Moisture (%)",
    "Dry matter (%)",
    "Total viable count (CFU)",
    "Lactic acid bacteria",
    "Duration (h)",
];

/// Which product line a selection belongs to.
///
/// The two products drive every per-product lookup: target column, fallback
/// curve, quality thresholds, KPI cards and process constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Fermented drink; quality value is pH, falling over time.
    Ayran,
    /// Cooked and dried curd; quality value is moisture %, falling over time.
    Irimshik,
}

impl ProductKind {
    /// Resolve the product kind from a product name as it appears in the data.
    pub fn from_product_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("айран") || lower.contains("ayran") {
            ProductKind::Ayran
        } else {
            ProductKind::Irimshik
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProductKind::Ayran => "Ayran",
            ProductKind::Irimshik => "Sary irimshik",
        }
    }

    pub fn profile(self) -> &'static ProductProfile {
        match self {
            ProductKind::Ayran => &AYRAN,
            ProductKind::Irimshik => &IRIMSHIK,
        }
    }
}

/// Closed-form curves used when no model can be fitted.
///
/// The constants come from the physical process that generates the sample data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackCurve {
    /// `start - rate * ln(t + 1)`
    Acidification { start: f64, rate: f64 },
    /// `equilibrium + (initial - equilibrium) * exp(-rate * t)`
    Drying { equilibrium: f64, initial: f64, rate: f64 },
}

/// How a threshold compares against the predicted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Below(f64),
    Above(f64),
}

/// Outcome of the quality check, ordered by how bad it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityStatus {
    Normal,
    OverAcidified,
    UnderSet,
    OverDried,
}

impl QualityStatus {
    pub fn label(self) -> &'static str {
        match self {
            QualityStatus::Normal => "normal",
            QualityStatus::OverAcidified => "over-acidified",
            QualityStatus::UnderSet => "under-set",
            QualityStatus::OverDried => "over-dried",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            QualityStatus::Normal => Severity::Ok,
            QualityStatus::UnderSet => Severity::Warning,
            QualityStatus::OverAcidified | QualityStatus::OverDried => Severity::Critical,
        }
    }
}

/// One row of a product's quality threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub comparison: Comparison,
    /// The rule only applies strictly after this many hours, when set.
    pub after_hours: Option<f64>,
    pub status: QualityStatus,
}

/// A KPI card: a numeric column averaged over the selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSpec {
    pub column: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
}

/// Static per-product configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductProfile {
    pub kind: ProductKind,
    /// Quality column used as the regression target.
    pub target_column: &'static str,
    pub target_label: &'static str,
    pub target_unit: &'static str,
    /// Desired end-of-process quality value.
    pub goal: f64,
    /// Maximum acceptable MAE of the production model.
    pub accuracy_limit: f64,
    pub fallback: FallbackCurve,
    pub thresholds: &'static [ThresholdRule],
    pub kpis: &'static [KpiSpec],
    /// Pasteurization / cooking set point (°C).
    pub pasteurization_c: f64,
    /// Temperature after cooling, i.e. the fermentation set point (°C).
    pub cooled_c: f64,
    /// Trend colour (RGB) for charts.
    pub accent: (u8, u8, u8),
}

pub static AYRAN: ProductProfile = ProductProfile {
    kind: ProductKind::Ayran,
    target_column: "ph",
    target_label: "pH",
    target_unit: "",
    goal: 4.6,
    accuracy_limit: 0.05,
    fallback: FallbackCurve::Acidification {
        start: 5.98,
        rate: 0.7,
    },
    thresholds: &[
        ThresholdRule {
            comparison: Comparison::Below(4.0),
            after_hours: None,
            status: QualityStatus::OverAcidified,
        },
        ThresholdRule {
            comparison: Comparison::Above(5.0),
            after_hours: Some(6.0),
            status: QualityStatus::UnderSet,
        },
    ],
    kpis: &[
        KpiSpec { column: "ph", title: "pH (active)", unit: "" },
        KpiSpec { column: "кислотность", title: "Acidity", unit: "°T" },
        KpiSpec { column: "viscosity_mpa_s", title: "Viscosity", unit: "mPa·s" },
        KpiSpec { column: "fat_pct", title: "Fat", unit: "%" },
        KpiSpec { column: "protein_pct", title: "Protein", unit: "%" },
        KpiSpec { column: "kmafanm", title: "Total viable count", unit: "CFU" },
    ],
    pasteurization_c: 84.0,
    cooled_c: 42.0,
    accent: (0, 255, 136),
};

pub static IRIMSHIK: ProductProfile = ProductProfile {
    kind: ProductKind::Irimshik,
    target_column: "влага",
    target_label: "Moisture",
    target_unit: "%",
    goal: 18.0,
    accuracy_limit: 2.0,
    fallback: FallbackCurve::Drying {
        equilibrium: 18.0,
        initial: 75.0,
        rate: 0.3,
    },
    thresholds: &[ThresholdRule {
        comparison: Comparison::Below(15.0),
        after_hours: None,
        status: QualityStatus::OverDried,
    }],
    kpis: &[
        KpiSpec { column: "влага", title: "Moisture", unit: "%" },
        KpiSpec { column: "сухие_вещества", title: "Dry matter", unit: "%" },
        KpiSpec { column: "fat_pct", title: "Fat", unit: "%" },
        KpiSpec { column: "protein_pct", title: "Protein", unit: "%" },
        KpiSpec { column: "ph", title: "pH", unit: "" },
        KpiSpec { column: "density_kg_m3", title: "Density", unit: "kg/m³" },
    ],
    pasteurization_c: 96.0,
    cooled_c: 20.0,
    accent: (0, 191, 255),
};

/// One `(elapsed_time, quality_value)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Hours since process start.
    pub elapsed: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(elapsed: f64, value: f64) -> Self {
        Self { elapsed, value }
    }

    /// Valid samples have finite values and non-negative elapsed time.
    pub fn is_valid(&self) -> bool {
        self.elapsed.is_finite() && self.value.is_finite() && self.elapsed >= 0.0
    }
}

/// Regression family: the regressor is `t` or `ln(t + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Logarithmic,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear",
            ModelKind::Logarithmic => "Logarithmic",
        }
    }
}

/// Fitted coefficients `y = intercept + slope * x(t)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub intercept: f64,
    pub slope: f64,
}

impl FittedModel {
    pub fn predict(&self, t: f64) -> f64 {
        crate::models::predict(self.kind, t, self.intercept, self.slope)
    }
}

/// Goodness-of-fit diagnostics over the training set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n: usize,
}

/// Fit output for a single model kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FittedModel,
    pub quality: FitQuality,
}

/// Per-sample fitted value (for exports and plots).
#[derive(Debug, Clone, Copy)]
pub struct SampleResidual {
    pub sample: Sample,
    pub fitted: f64,
    pub residual: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Explicit dataset path; `None` means "resolve from env/default names".
    pub data_path: Option<PathBuf>,
    /// Product name as it appears in the data (`None` picks the default).
    pub product: Option<String>,
    /// Experiment type filter (`None` means all batches).
    pub experiment: Option<String>,
    /// Process time used for the prediction / SCADA snapshot (hours).
    pub time_hours: f64,
    /// Optimizer target (`None` means the product goal).
    pub target: Option<f64>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_model: Option<PathBuf>,
    pub export_predictions: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            product: None,
            experiment: None,
            time_hours: 5.0,
            target: None,
            plot: true,
            plot_width: 80,
            plot_height: 20,
            export_model: None,
            export_predictions: None,
        }
    }
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub product: String,
    pub product_kind: ProductKind,
    pub target_label: String,
    pub target_unit: String,
    pub model: FittedModel,
    pub fit_quality: FitQuality,
    pub grid: ModelGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGrid {
    pub time_hours: Vec<f64>,
    pub value: Vec<f64>,
}
