//! Command-line parsing for the dairy digital twin.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DashboardConfig, ProductKind};
use crate::surface::SurfaceKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "twin", version, about = "Dairy production digital twin (ayran / sary irimshik)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// KPI cards, process journal and quality forecast for one selection.
    Dashboard(DashboardArgs),
    /// Compare linear and logarithmic models (MAE / RMSE / R²).
    Models(DashboardArgs),
    /// Solve for the process time at which a quality target is reached.
    Optimize(DashboardArgs),
    /// Show the SCADA line state at a process time.
    Scada(ScadaArgs),
    /// Heating / cooling energy of a batch.
    Energy(EnergyArgs),
    /// Additive-dose experiment curves and forecast table.
    Experiments(ExperimentArgs),
    /// Dose × time response surfaces.
    Surface(SurfaceArgs),
    /// List the 14 controlled variables of the process state vector.
    State,
    /// Write a seeded synthetic measurement CSV.
    Generate(GenerateArgs),
    /// Plot a previously exported model JSON.
    Plot(PlotArgs),
    /// Write a markdown analysis bundle of every product/experiment fit.
    Bundle(BundleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same pipeline as `twin dashboard`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(DashboardArgs),
}

/// Dataset and selection options.
#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// Measurement CSV (default: $TWIN_DATA, then Scientific_Data_Extended.csv, then Scientific_Data.csv).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Product name as it appears in the data (default: the ayran line).
    #[arg(short = 'p', long)]
    pub product: Option<String>,

    /// Restrict to one experiment type (default: all batches).
    #[arg(short = 'e', long)]
    pub experiment: Option<String>,
}

/// Common options for the dashboard views.
#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Process time for the forecast (hours, 0-10).
    #[arg(short = 't', long, default_value_t = 5.0)]
    pub time: f64,

    /// Optimizer target (default: product goal clamped to the observed range).
    #[arg(long)]
    pub target: Option<f64>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fitted logarithmic model (coefficients + grid) to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,

    /// Export per-sample observed / fitted / residual values to CSV.
    #[arg(long = "export-predictions", value_name = "CSV")]
    pub export_predictions: Option<PathBuf>,
}

impl DashboardArgs {
    pub fn to_config(&self) -> DashboardConfig {
        DashboardConfig {
            data_path: self.data.data.clone(),
            product: self.data.product.clone(),
            experiment: self.data.experiment.clone(),
            time_hours: self.time,
            target: self.target,
            plot: !self.no_plot,
            plot_width: self.width,
            plot_height: self.height,
            export_model: self.export_model.clone(),
            export_predictions: self.export_predictions.clone(),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ScadaArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Process time (hours, 0 to the longest observed duration).
    #[arg(short = 't', long, default_value_t = 0.0)]
    pub time: f64,
}

#[derive(Debug, Args, Clone)]
pub struct EnergyArgs {
    /// Product line.
    #[arg(long, value_enum, default_value_t = ProductKind::Ayran)]
    pub line: ProductKind,

    /// Batch volume (litres, 100-5000).
    #[arg(long, default_value_t = crate::energy::DEFAULT_VOLUME_L)]
    pub volume: f64,

    /// Raw milk inlet temperature (°C, 4-25).
    #[arg(long, default_value_t = crate::energy::DEFAULT_INLET_C)]
    pub inlet: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ExperimentArgs {
    /// Product line.
    #[arg(long, value_enum, default_value_t = ProductKind::Ayran)]
    pub line: ProductKind,

    /// Target value for time-to-target (default: pH 4.6 / moisture 18 %).
    #[arg(long)]
    pub target: Option<f64>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    #[arg(long, default_value_t = 80)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SurfaceArgs {
    /// Product line (shows both of its surfaces unless --kind is given).
    #[arg(long, value_enum, default_value_t = ProductKind::Ayran)]
    pub line: ProductKind,

    /// A single surface.
    #[arg(long, value_enum)]
    pub kind: Option<SurfaceKind>,

    /// Grid points per axis.
    #[arg(long, default_value_t = crate::surface::SURFACE_GRID)]
    pub grid: usize,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output CSV.
    #[arg(short = 'o', long, default_value = "Scientific_Data_Extended.csv")]
    pub output: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Batches per experiment group (1-1000).
    #[arg(long, default_value_t = 2)]
    pub batches: usize,

    /// Sampling step (hours, at least 0.01).
    #[arg(long, default_value_t = 0.5)]
    pub step: f64,

    /// Noise multiplier (0 gives exact curves).
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Overwrite an existing output file.
    #[arg(long)]
    pub force: bool,
}

/// Options for plotting a saved model.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Model JSON file produced by `--export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct BundleArgs {
    /// Measurement CSV (same lookup as the other commands).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Forecast time recorded for every selection (hours).
    #[arg(short = 't', long, default_value_t = 5.0)]
    pub time: f64,

    /// Output directory.
    #[arg(long, default_value = crate::bundle::BUNDLE_DIR)]
    pub dir: PathBuf,
}
