//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset and runs the dashboard pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{BundleArgs, Command, DashboardArgs, EnergyArgs, ExperimentArgs, GenerateArgs, PlotArgs, ScadaArgs, SurfaceArgs};
use crate::data::GeneratorConfig;
use crate::domain::{DashboardConfig, ModelKind};
use crate::error::AppError;
use crate::fit::fit_with_quality;
use crate::io::{ExportContext, build_model_file, write_model_json, write_predictions_csv};
use crate::plot::{TrendPlot, render_ascii_plot};
use crate::report;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `twin` binary.
pub fn run() -> Result<(), AppError> {
    // We want `twin` and `twin -p Айран` to behave like `twin tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Dashboard(args) => handle_dashboard(args),
        Command::Models(args) => handle_models(args),
        Command::Optimize(args) => handle_optimize(args),
        Command::Scada(args) => handle_scada(args),
        Command::Energy(args) => handle_energy(args),
        Command::Experiments(args) => handle_experiments(args),
        Command::Surface(args) => handle_surface(args),
        Command::State => {
            print!("{}", report::format_state_vector());
            Ok(())
        }
        Command::Generate(args) => handle_generate(args),
        Command::Plot(args) => handle_plot(args),
        Command::Bundle(args) => handle_bundle(args),
        Command::Tui(args) => crate::tui::run(args.to_config()),
    }
}

fn handle_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let dataset = pipeline::load(&config)?;
    let run = pipeline::run_dashboard(&dataset, &config)?;

    println!("{}", report::format_dashboard(&dataset, &run));
    if config.plot {
        println!("{}", trend_plot(&run, &config));
    }
    write_exports(&run, &config)
}

fn handle_models(args: DashboardArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let dataset = pipeline::load(&config)?;
    let run = pipeline::run_dashboard(&dataset, &config)?;

    println!(
        "Product: {} | batch: {} | n={}\n",
        run.product,
        run.experiment.as_deref().unwrap_or(report::ALL_BATCHES),
        run.samples.len()
    );
    // The comparison needs real fits; it never falls back to the theoretical curve.
    let comparison = run.comparison.clone().map_err(AppError::from)?;
    println!("{}", report::format_models(run.profile(), &Ok(comparison)));

    if config.plot {
        println!("{}", trend_plot(&run, &config));
    }
    write_exports(&run, &config)
}

fn handle_optimize(args: DashboardArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let dataset = pipeline::load(&config)?;
    let selection = pipeline::select(&dataset, &config)?;
    let profile = selection.kind.profile();
    let samples = selection.quality_samples();

    let opt = pipeline::optimize(&samples, profile, config.target)?;
    println!("{}", report::format_optimization(profile, &opt));

    if config.plot {
        let plot = TrendPlot {
            samples: &[],
            curve: &opt.grid,
            target: Some(opt.target),
            value_label: profile.target_label,
        };
        println!("{}", render_ascii_plot(&plot, config.plot_width, config.plot_height));
    }
    Ok(())
}

fn handle_scada(args: ScadaArgs) -> Result<(), AppError> {
    let config = DashboardConfig {
        data_path: args.data.data.clone(),
        product: args.data.product.clone(),
        experiment: args.data.experiment.clone(),
        ..DashboardConfig::default()
    };
    let dataset = pipeline::load(&config)?;
    let selection = pipeline::select(&dataset, &config)?;

    let max_t = selection.max_duration().unwrap_or(12.0);
    if !(args.time.is_finite() && (0.0..=max_t).contains(&args.time)) {
        return Err(AppError::new(
            2,
            format!("Process time must be in [0, {max_t}] h (got {}).", args.time),
        ));
    }

    let snap = crate::scada::snapshot(&selection, args.time);
    print!("{}", crate::scada::render_text(&snap));
    Ok(())
}

fn handle_energy(args: EnergyArgs) -> Result<(), AppError> {
    let profile = args.line.profile();
    let balance = crate::energy::energy_balance(profile, args.volume, args.inlet)?;
    print!("{}", report::format_energy(profile, &balance));
    Ok(())
}

fn handle_experiments(args: ExperimentArgs) -> Result<(), AppError> {
    let set = crate::surface::experiment_set(args.line);
    let target = args.target.unwrap_or(set.target);
    if !target.is_finite() {
        return Err(AppError::new(2, "Target must be a finite number."));
    }
    println!("{}", report::format_experiments(set, target));

    if !args.no_plot {
        for (curve, points) in set.curves.iter().zip(set.sampled_curves(100)) {
            let plot = TrendPlot {
                samples: &[],
                curve: &points,
                target: Some(target),
                value_label: set.value_label,
            };
            println!("{}", curve.label);
            println!("{}", render_ascii_plot(&plot, args.width, args.height));
        }
    }
    Ok(())
}

fn handle_surface(args: SurfaceArgs) -> Result<(), AppError> {
    if args.grid < 2 {
        return Err(AppError::new(2, "Surface grid needs at least 2 points per axis."));
    }
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => crate::surface::SurfaceKind::for_product(args.line).to_vec(),
    };
    for kind in kinds {
        let surface = crate::surface::evaluate_surface(kind, args.grid);
        println!("{}", report::format_surface(&surface));
    }
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    if args.output.exists() && !args.force {
        return Err(AppError::new(
            2,
            format!("'{}' already exists (use --force to overwrite).", args.output.display()),
        ));
    }
    let config = GeneratorConfig {
        seed: args.seed,
        batches: args.batches,
        step_hours: args.step,
        noise_scale: args.noise,
    };
    let rows = crate::data::write_dataset(&args.output, &config)?;
    println!("Wrote {rows} rows to {} (seed {}).", args.output.display(), args.seed);
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let model = crate::io::read_model_json(&args.model)?;
    println!(
        "{} ({}): {}",
        model.product,
        model.model.kind.display_name(),
        crate::models::formula(model.model.kind, &model.target_label, model.model.intercept, model.model.slope)
    );
    println!(
        "{}",
        crate::plot::render_ascii_plot_from_model_file(&model, args.width, args.height)
    );
    Ok(())
}

fn handle_bundle(args: BundleArgs) -> Result<(), AppError> {
    let config = DashboardConfig {
        data_path: args.data.clone(),
        ..DashboardConfig::default()
    };
    let dataset = pipeline::load(&config)?;
    let path = crate::bundle::write_bundle(&dataset, &args.dir, args.time)?;
    println!("Bundle written to {}", path.display());
    Ok(())
}

/// Samples, prediction curve and goal line of a dashboard run.
fn trend_plot(run: &RunOutput, config: &DashboardConfig) -> String {
    let profile = run.profile();
    let t_max = run.max_duration.unwrap_or(12.0).max(*pipeline::PREDICTION_RANGE.end());
    let curve: Vec<(f64, f64)> = crate::surface::linspace(0.0, t_max, config.plot_width.max(2))
        .into_iter()
        .map(|t| (t, run.predictor.predict(t)))
        .collect();
    let plot = TrendPlot {
        samples: &run.samples,
        curve: &curve,
        target: Some(profile.goal),
        value_label: profile.target_label,
    };
    render_ascii_plot(&plot, config.plot_width, config.plot_height)
}

fn write_exports(run: &RunOutput, config: &DashboardConfig) -> Result<(), AppError> {
    if config.export_model.is_none() && config.export_predictions.is_none() {
        return Ok(());
    }
    // Exports describe a fitted model; the theoretical curve is not exported.
    if run.predictor.is_theoretical() {
        return Err(AppError::new(3, "Nothing to export: the selection uses the theoretical model."));
    }

    if let Some(path) = &config.export_predictions {
        let ctx = ExportContext {
            product: &run.product,
            experiment: run.experiment.as_deref(),
            model: "logarithmic",
        };
        write_predictions_csv(path, &run.residuals, ctx)?;
        tracing::info!(path = %path.display(), rows = run.residuals.len(), "predictions exported");
    }
    if let Some(path) = &config.export_model {
        let fit = fit_with_quality(ModelKind::Logarithmic, &run.samples)?;
        let file = build_model_file(&run.product, run.kind, &fit, run.max_duration.unwrap_or(12.0));
        write_model_json(path, &file)?;
        tracing::info!(path = %path.display(), "model exported");
    }
    Ok(())
}

/// Rewrite argv so `twin` defaults to `twin tui`.
///
/// Rules:
/// - `twin`                      -> `twin tui`
/// - `twin -p Айран ...`         -> `twin tui -p Айран ...`
/// - `twin --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
