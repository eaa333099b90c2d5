//! Analysis bundle writer: a timestamped markdown snapshot of every
//! product/experiment fit in the loaded dataset.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::data::{Dataset, Selection};
use crate::domain::ModelKind;
use crate::error::AppError;
use crate::fit::{Predictor, compare_models, solve_time_for_target};
use crate::models::formula;

/// Default bundle directory (relative to the working directory).
pub const BUNDLE_DIR: &str = "bundle";

/// Write a bundle into `dir` and return its path.
pub fn write_bundle(dataset: &Dataset, dir: &Path, time_hours: f64) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create bundle dir: {e}")))?;

    let now = Local::now();
    let path = dir.join(format!("twin_bundle_{}.md", now.format("%Y%m%d_%H%M%S")));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create bundle file: {e}")))?;
    file.write_all(render_bundle(dataset, now, time_hours).as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write bundle: {e}")))?;

    tracing::info!(path = %path.display(), "bundle written");
    Ok(path)
}

/// Markdown body of a bundle.
pub fn render_bundle(dataset: &Dataset, generated: DateTime<Local>, time_hours: f64) -> String {
    let mut md = String::new();
    md.push_str("# twin analysis bundle\n");
    md.push_str(&format!("- generated: {}\n", generated.to_rfc3339()));
    md.push_str(&format!("- data: {}\n", dataset.source.display()));
    md.push_str(&format!(
        "- rows: read={} used={} skipped={}\n",
        dataset.rows_read,
        dataset.records.len(),
        dataset.row_errors.len()
    ));
    md.push_str(&format!("- forecast time: {time_hours:.1} h\n"));

    for product in dataset.products() {
        md.push_str(&format!("\n## {product}\n"));

        let mut filters = vec![None];
        filters.extend(dataset.experiment_types(&product).into_iter().map(Some));

        md.push_str("| batch | n | model | MAE | R² | forecast | time to goal |\n");
        md.push_str("| - | - | - | - | - | - | - |\n");
        for filter in filters {
            match dataset.select(&product, filter.as_deref()) {
                Ok(selection) => md.push_str(&bundle_row(&selection, time_hours)),
                Err(err) => md.push_str(&format!(
                    "| {} | - | error: {err} | - | - | - | - |\n",
                    filter.as_deref().unwrap_or("all")
                )),
            }
        }
    }

    if !dataset.row_errors.is_empty() {
        md.push_str("\n## Skipped rows\n");
        for err in &dataset.row_errors {
            md.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
    }
    md
}

fn bundle_row(selection: &Selection<'_>, time_hours: f64) -> String {
    let profile = selection.kind.profile();
    let samples = selection.quality_samples();
    let predictor = Predictor::for_samples(profile, &samples);
    let label = selection.experiment.as_deref().unwrap_or("all");

    let (model, mae, r2) = match compare_models(&samples, profile) {
        Ok(cmp) => {
            let log = cmp.get(ModelKind::Logarithmic);
            (
                formula(ModelKind::Logarithmic, profile.target_label, log.model.intercept, log.model.slope),
                format!("{:.4}", log.quality.mae),
                format!("{:.4}", log.quality.r2),
            )
        }
        Err(err) => (
            format!("theoretical: {} ({err})", predictor.formula(profile.target_label)),
            "-".to_string(),
            "-".to_string(),
        ),
    };

    let goal_time = predictor
        .fitted()
        .and_then(|m| solve_time_for_target(m, profile.goal).ok())
        .map(|t| format!("{t:.2} h"))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "| {label} | {} | {model} | {mae} | {r2} | {:.2} | {goal_time} |\n",
        samples.len(),
        predictor.predict(time_hours)
    )
}
