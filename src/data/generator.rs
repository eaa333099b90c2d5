//! Synthetic measurement generation from the physical process curves.
//!
//! The generated file follows the layout the dashboard reads: one row per
//! `(product, experiment, batch, time)` observation. Quality values follow the
//! same closed-form curves used as fallback models, shifted per experiment and
//! perturbed by Gaussian noise.

use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;

use crate::domain::ProductKind;
use crate::error::AppError;
use crate::scada::stage_at;

/// Experiment groups and their additive doses (%).
const EXPERIMENTS: [(&str, f64); 3] = [("Контроль", 0.0), ("Опыт 1", 3.0), ("Опыт 2", 4.0)];

/// Irimshik doses (%) per experiment group.
const IRIMSHIK_DOSES: [f64; 3] = [0.0, 4.0, 5.0];

/// Product names as they appear in production exports.
pub const AYRAN_NAME: &str = "Айран";
pub const IRIMSHIK_NAME: &str = "Сары ірімшік";

/// Finest sampling step (hours) and largest batch count accepted.
pub const MIN_STEP_HOURS: f64 = 0.01;
pub const MAX_BATCHES: usize = 1000;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Independent batches per experiment group.
    pub batches: usize,
    /// Sampling step (hours).
    pub step_hours: f64,
    /// Multiplier on every noise standard deviation (0 gives exact curves).
    pub noise_scale: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            batches: 2,
            step_hours: 0.5,
            noise_scale: 1.0,
        }
    }
}

/// One generated CSV row.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRow {
    pub productname: String,
    pub experiment_type: String,
    pub batch_id: String,
    pub process_stage: String,
    pub duration_hours: f64,
    pub temperature_c: f64,
    pub ph: f64,
    #[serde(rename = "кислотность")]
    pub acidity_t: f64,
    pub viscosity_mpa_s: f64,
    pub density_kg_m3: f64,
    pub fat_pct: f64,
    pub protein_pct: f64,
    #[serde(rename = "влага")]
    pub moisture_pct: f64,
    #[serde(rename = "сухие_вещества")]
    pub dry_matter_pct: f64,
    pub kmafanm: f64,
    pub pressure_mpa: f64,
}

/// Generate rows for both products.
pub fn generate_rows(config: &GeneratorConfig) -> Result<Vec<GeneratedRow>, AppError> {
    if !(1..=MAX_BATCHES).contains(&config.batches) {
        return Err(AppError::new(2, format!("Batch count must be in [1, {MAX_BATCHES}].")));
    }
    if !(config.step_hours.is_finite() && config.step_hours >= MIN_STEP_HOURS) {
        return Err(AppError::new(
            2,
            format!("Sampling step must be at least {MIN_STEP_HOURS} h (got {}).", config.step_hours),
        ));
    }
    if !(config.noise_scale.is_finite() && config.noise_scale >= 0.0) {
        return Err(AppError::new(2, "Noise scale must be >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let mut noise = |sd: f64| normal.sample(&mut rng) * sd * config.noise_scale;

    let mut rows = Vec::new();

    for (exp_idx, &(experiment, dose)) in EXPERIMENTS.iter().enumerate() {
        for batch in 0..config.batches {
            let batch_id = format!("A-{}-{:02}", exp_idx + 1, batch + 1);
            // Additives slow (exp. 1) or speed up (exp. 2) acidification.
            let rate = match exp_idx {
                0 => 0.7,
                1 => 0.7 - 0.03 * dose,
                _ => 0.7 + 0.025 * dose,
            };
            for t in time_grid(12.0, config.step_hours) {
                let ph = 5.98 - rate * t.ln_1p() + noise(0.03);
                let moisture = 89.5 + noise(0.3);
                rows.push(GeneratedRow {
                    productname: AYRAN_NAME.to_string(),
                    experiment_type: experiment.to_string(),
                    batch_id: batch_id.clone(),
                    process_stage: stage_label(ProductKind::Ayran, t),
                    duration_hours: round_to(t, 2),
                    temperature_c: round_to(ayran_temperature(t) + noise(0.4), 2),
                    ph: round_to(ph, 3),
                    acidity_t: round_to((7.0 - ph) * 40.0 + noise(1.5), 1),
                    viscosity_mpa_s: round_to(1.5 + 0.45 * t + noise(0.1), 2),
                    density_kg_m3: round_to(1028.0 + 0.3 * t + noise(0.5), 1),
                    fat_pct: round_to(1.5 + noise(0.05), 2),
                    protein_pct: round_to(2.8 + 0.1 * dose + noise(0.05), 2),
                    moisture_pct: round_to(moisture, 2),
                    dry_matter_pct: round_to(100.0 - moisture, 2),
                    kmafanm: (1.0e6 * (1.0 + t) * (1.0 + noise(0.05))).round(),
                    pressure_mpa: if (0.5..1.0).contains(&t) { 12.5 } else { 0.0 },
                });
            }
        }
    }

    for (exp_idx, &(experiment, _)) in EXPERIMENTS.iter().enumerate() {
        let dose = IRIMSHIK_DOSES[exp_idx];
        for batch in 0..config.batches {
            let batch_id = format!("I-{}-{:02}", exp_idx + 1, batch + 1);
            let initial = 75.0 - dose;
            let rate = 0.3 + 0.04 * dose;
            for t in time_grid(10.0, config.step_hours) {
                let moisture = 18.0 + (initial - 18.0) * (-rate * t).exp() + noise(0.8);
                rows.push(GeneratedRow {
                    productname: IRIMSHIK_NAME.to_string(),
                    experiment_type: experiment.to_string(),
                    batch_id: batch_id.clone(),
                    process_stage: stage_label(ProductKind::Irimshik, t),
                    duration_hours: round_to(t, 2),
                    temperature_c: round_to(irimshik_temperature(t) + noise(0.5), 2),
                    ph: round_to(5.98 - 0.25 * t.ln_1p() + noise(0.03), 3),
                    acidity_t: round_to(45.0 + 6.0 * t.ln_1p() + noise(1.5), 1),
                    viscosity_mpa_s: round_to(1.8 + 2.5 * t + noise(0.3), 2),
                    density_kg_m3: round_to(1040.0 + 9.0 * t + noise(2.0), 1),
                    fat_pct: round_to(18.0 + 0.4 * dose + noise(0.3), 2),
                    protein_pct: round_to(20.0 + noise(0.3), 2),
                    moisture_pct: round_to(moisture, 2),
                    dry_matter_pct: round_to(100.0 - moisture, 2),
                    kmafanm: (5.0e3 * (1.0 + noise(0.05))).round(),
                    pressure_mpa: if (1.0..5.0).contains(&t) { 0.6 } else { 0.0 },
                });
            }
        }
    }

    tracing::debug!(rows = rows.len(), seed = config.seed, "generated synthetic dataset");
    Ok(rows)
}

/// Serialize generated rows as CSV.
pub fn write_rows<W: Write>(writer: W, rows: &[GeneratedRow]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write generated row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush generated CSV: {e}")))?;
    Ok(())
}

/// Generate and write a dataset file.
pub fn write_dataset(path: &Path, config: &GeneratorConfig) -> Result<usize, AppError> {
    let rows = generate_rows(config)?;
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    write_rows(file, &rows)?;
    Ok(rows.len())
}

fn time_grid(max_hours: f64, step: f64) -> impl Iterator<Item = f64> {
    let steps = (max_hours / step).floor() as usize;
    (0..=steps).map(move |i| i as f64 * step)
}

fn stage_label(product: ProductKind, t: f64) -> String {
    stage_at(product, t)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "Cooling".to_string())
}

fn ayran_temperature(t: f64) -> f64 {
    match t {
        t if t < 0.5 => 42.0,
        t if t < 1.0 => 65.0,
        t if t < 1.5 => 84.0,
        t if t < 2.0 => 60.0,
        t if t < 8.0 => 42.0,
        _ => 4.0,
    }
}

fn irimshik_temperature(t: f64) -> f64 {
    match t {
        t if t < 1.0 => 34.0,
        t if t < 5.0 => 96.5,
        t if t < 6.0 => 60.0,
        _ => 45.0,
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_seed() {
        let config = GeneratorConfig::default();
        let a = generate_rows(&config).unwrap();
        let b = generate_rows(&config).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.ph, y.ph);
            assert_eq!(x.moisture_pct, y.moisture_pct);
        }

        let other = generate_rows(&GeneratorConfig { seed: 7, ..config }).unwrap();
        assert!(a.iter().zip(&other).any(|(x, y)| x.ph != y.ph));
    }

    #[test]
    fn noiseless_rows_follow_fallback_curves() {
        let config = GeneratorConfig {
            noise_scale: 0.0,
            batches: 1,
            ..GeneratorConfig::default()
        };
        let rows = generate_rows(&config).unwrap();

        let ayran_start = rows
            .iter()
            .find(|r| r.productname == AYRAN_NAME && r.experiment_type == "Контроль")
            .unwrap();
        assert_eq!(ayran_start.ph, 5.98);

        let irimshik_start = rows
            .iter()
            .find(|r| r.productname == IRIMSHIK_NAME && r.experiment_type == "Контроль")
            .unwrap();
        assert_eq!(irimshik_start.moisture_pct, 75.0);
    }

    #[test]
    fn row_counts_follow_grid() {
        let config = GeneratorConfig {
            batches: 1,
            ..GeneratorConfig::default()
        };
        let rows = generate_rows(&config).unwrap();
        // 25 ayran points + 21 irimshik points per experiment group.
        assert_eq!(rows.len(), 3 * 25 + 3 * 21);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GeneratorConfig {
            batches: 0,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn tiny_steps_and_huge_batch_counts_are_rejected() {
        for step_hours in [1e-12, 0.0, -0.5, f64::NAN, 0.009] {
            let config = GeneratorConfig {
                step_hours,
                ..GeneratorConfig::default()
            };
            assert_eq!(generate_rows(&config).unwrap_err().exit_code(), 2, "step {step_hours}");
        }

        let config = GeneratorConfig {
            batches: MAX_BATCHES + 1,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_rows(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn finest_step_is_accepted() {
        let config = GeneratorConfig {
            batches: 1,
            step_hours: MIN_STEP_HOURS,
            ..GeneratorConfig::default()
        };
        let rows = generate_rows(&config).unwrap();
        assert!(rows.len() > 3 * 1000);
    }
}
