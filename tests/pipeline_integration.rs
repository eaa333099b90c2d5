//! End-to-end: generate a dataset file, load it back and run the dashboard
//! pipeline, exports and bundle against it.

use std::path::Path;

use dairy_twin::app::pipeline::run_dashboard;
use dairy_twin::bundle::write_bundle;
use dairy_twin::data::{AYRAN_NAME, Dataset, GeneratorConfig, IRIMSHIK_NAME, write_dataset};
use dairy_twin::domain::{DashboardConfig, ModelKind, ProductKind, QualityStatus};
use dairy_twin::energy::energy_balance;
use dairy_twin::fit::{Predictor, fit_with_quality};
use dairy_twin::io::{ExportContext, build_model_file, load_dataset, read_model_json, write_model_json, write_predictions_csv};
use dairy_twin::plot::render_ascii_plot_from_model_file;
use dairy_twin::scada::UnitStatus;

fn generated(dir: &Path) -> Dataset {
    let path = dir.join("dataset.csv");
    let rows = write_dataset(&path, &GeneratorConfig::default()).unwrap();
    assert_eq!(rows, 3 * 2 * 25 + 3 * 2 * 21);
    load_dataset(&path).unwrap()
}

fn config_for(product: &str) -> DashboardConfig {
    DashboardConfig {
        product: Some(product.to_string()),
        ..DashboardConfig::default()
    }
}

#[test]
fn ayran_dashboard_runs_on_generated_data() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated(dir.path());
    assert!(dataset.row_errors.is_empty());

    let run = run_dashboard(&dataset, &config_for(AYRAN_NAME)).unwrap();
    assert_eq!(run.kind, ProductKind::Ayran);
    assert!(matches!(run.predictor, Predictor::Fitted(_)));
    assert_eq!(run.prediction.status, QualityStatus::Normal);
    // 5.98 - 0.7 * ln(6) ≈ 4.73, generated rates vary by experiment.
    assert!((4.4..5.0).contains(&run.prediction.value), "{}", run.prediction.value);

    let cmp = run.comparison.as_ref().unwrap();
    assert_eq!(cmp.best, ModelKind::Logarithmic);

    let opt = run.optimization.as_ref().unwrap();
    assert_eq!(opt.target, 4.6);
    let t = *opt.time_hours.as_ref().unwrap();
    assert!(t > 5.0 && t < 12.0, "time to target {t}");
}

#[test]
fn irimshik_dashboard_filters_by_experiment() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated(dir.path());

    let experiments = dataset.experiment_types(IRIMSHIK_NAME);
    assert_eq!(experiments.len(), 3);

    let mut config = config_for(IRIMSHIK_NAME);
    config.experiment = Some(experiments[0].clone());
    let run = run_dashboard(&dataset, &config).unwrap();
    assert_eq!(run.kind, ProductKind::Irimshik);
    assert_eq!(run.n_points, 2 * 21);
    assert!(run.scada.readings.moisture < 75.0);
}

#[test]
fn too_few_rows_fall_back_to_theoretical_curve() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.csv");
    std::fs::write(
        &path,
        "productname,duration_hours,ph\nАйран,0,5.9\nАйран,1,5.5\nАйран,2,5.2\n",
    )
    .unwrap();
    let dataset = load_dataset(&path).unwrap();

    let run = run_dashboard(&dataset, &DashboardConfig::default()).unwrap();
    assert!(run.predictor.is_theoretical());
    // 5.98 - 0.7 * ln(6)
    assert!((run.prediction.value - (5.98 - 0.7 * 6f64.ln())).abs() < 1e-9);
    assert!(run.comparison.is_err());
    assert_eq!(run.optimization.as_ref().unwrap_err().exit_code(), 3);
}

#[test]
fn exports_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated(dir.path());
    let run = run_dashboard(&dataset, &config_for(AYRAN_NAME)).unwrap();

    let csv_path = dir.path().join("predictions.csv");
    let ctx = ExportContext {
        product: &run.product,
        experiment: run.experiment.as_deref(),
        model: "logarithmic",
    };
    write_predictions_csv(&csv_path, &run.residuals, ctx).unwrap();
    let body = std::fs::read_to_string(&csv_path).unwrap();
    assert!(body.starts_with("product,experiment,model,duration_hours,observed,fitted,residual"));
    assert_eq!(body.lines().count(), run.residuals.len() + 1);

    let result = fit_with_quality(ModelKind::Logarithmic, &run.samples).unwrap();
    let file = build_model_file(&run.product, run.kind, &result, 12.0);
    let json_path = dir.path().join("model.json");
    write_model_json(&json_path, &file).unwrap();
    let back = read_model_json(&json_path).unwrap();
    assert_eq!(back.model.kind, result.model.kind);
    assert!((back.model.intercept - result.model.intercept).abs() < 1e-12);
    assert!((back.model.slope - result.model.slope).abs() < 1e-12);
    assert_eq!(back.grid.time_hours.len(), back.grid.value.len());

    let plot = render_ascii_plot_from_model_file(&back, 60, 12);
    assert!(plot.starts_with("Plot:"));
}

#[test]
fn bundle_lists_both_products() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated(dir.path());
    let path = write_bundle(&dataset, &dir.path().join("bundle"), 5.0).unwrap();
    let body = std::fs::read_to_string(path).unwrap();
    assert!(body.contains(AYRAN_NAME));
    assert!(body.contains(IRIMSHIK_NAME));
}

#[test]
fn scada_line_follows_process_time() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated(dir.path());

    let mut config = config_for(AYRAN_NAME);
    config.time_hours = 0.2;
    let early = run_dashboard(&dataset, &config).unwrap();
    config.time_hours = 9.0;
    let late = run_dashboard(&dataset, &config).unwrap();

    let early_unit = early.scada.line.active_unit().map(|u| u.title);
    let late_unit = late.scada.line.active_unit().map(|u| u.title);
    assert!(early_unit.is_some());
    assert_ne!(early_unit, late_unit);
    assert!(late.scada.line.units.iter().any(|u| u.status == UnitStatus::Run));
}

#[test]
fn energy_balance_reference_batch() {
    let e = energy_balance(ProductKind::Ayran.profile(), 1000.0, 10.0).unwrap();
    assert!((e.heating_kwh - 82.57).abs() < 0.01);
    assert_eq!(energy_balance(ProductKind::Ayran.profile(), 50.0, 10.0).unwrap_err().exit_code(), 2);
}
