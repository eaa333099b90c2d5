//! Read/write model JSON files.
//!
//! A model file is the portable representation of a fitted quality curve:
//! - product + model kind + coefficients
//! - fit diagnostics
//! - a precomputed grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitResult, ModelFile, ModelGrid, ProductKind};
use crate::error::AppError;
use crate::fit::prediction_grid;

/// Points in the saved prediction grid.
pub const MODEL_GRID_POINTS: usize = 101;

/// Build the model file for a fit over `[0, t_max]` hours.
pub fn build_model_file(product: &str, kind: ProductKind, fit: &FitResult, t_max: f64) -> ModelFile {
    let t_max = if t_max.is_finite() && t_max > 0.0 { t_max } else { 12.0 };
    let (time_hours, value) = prediction_grid(&fit.model, 0.0, t_max, MODEL_GRID_POINTS)
        .into_iter()
        .unzip();
    let profile = kind.profile();

    ModelFile {
        tool: "twin".to_string(),
        product: product.to_string(),
        product_kind: kind,
        target_label: profile.target_label.to_string(),
        target_unit: profile.target_unit.to_string(),
        model: fit.model,
        fit_quality: fit.quality.clone(),
        grid: ModelGrid { time_hours, value },
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let model: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    if model.grid.time_hours.len() != model.grid.value.len() {
        return Err(AppError::new(2, "Invalid model JSON: grid columns differ in length."));
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FittedModel, ModelKind};

    #[test]
    fn model_file_survives_disk() {
        let fit = FitResult {
            model: FittedModel {
                kind: ModelKind::Logarithmic,
                intercept: 5.98,
                slope: -0.7,
            },
            quality: FitQuality {
                mae: 0.02,
                rmse: 0.03,
                r2: 0.98,
                n: 12,
            },
        };
        let file = build_model_file("Айран", ProductKind::Ayran, &fit, 10.0);
        assert_eq!(file.grid.time_hours.len(), MODEL_GRID_POINTS);
        assert_eq!(file.grid.value[0], 5.98);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_model_json(&path, &file).unwrap();
        let back = read_model_json(&path).unwrap();
        assert_eq!(back.product, "Айран");
        assert_eq!(back.model, fit.model);
        assert_eq!(back.target_label, "pH");
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = read_model_json(Path::new("/nonexistent/model.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
