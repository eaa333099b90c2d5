//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{Optimization, Prediction, RunOutput};
use crate::data::Dataset;
use crate::domain::{ModelKind, ProductProfile, STATE_VECTOR};
use crate::energy::EnergyBalance;
use crate::error::ModelError;
use crate::fit::{ModelComparison, Predictor};
use crate::report::{JournalTable, KpiCard};
use crate::surface::{ExperimentSet, ResponseSurface};

/// Label used for "no experiment filter".
pub const ALL_BATCHES: &str = "All batches";

/// Format the dashboard summary: selection, KPI cards, journal, prediction.
pub fn format_dashboard(dataset: &Dataset, out: &RunOutput) -> String {
    let profile = out.profile();
    let mut s = String::new();

    s.push_str("=== twin - Dairy Digital Twin ===\n");
    s.push_str(&format!("Data: {}", dataset.source.display()));
    if !dataset.row_errors.is_empty() {
        s.push_str(&format!(" ({} rows skipped)", dataset.row_errors.len()));
    }
    s.push('\n');
    s.push_str(&format!(
        "Product: {} ({}) | batch: {} | n={} data points\n",
        out.product,
        out.kind.display_name(),
        out.experiment.as_deref().unwrap_or(ALL_BATCHES),
        out.n_points
    ));

    s.push_str("\nQuality indicators:\n");
    s.push_str(&format_kpis(&out.kpis));

    s.push_str("\nProcess journal:\n");
    s.push_str(&format_journal(&out.journal));

    s.push_str("\nForecast:\n");
    s.push_str(&format_prediction(profile, &out.predictor, &out.prediction));
    s
}

pub fn format_kpis(kpis: &[KpiCard]) -> String {
    let mut s = String::new();
    for card in kpis {
        let line = format!("  {:<20} {:>12} {}", card.title, card.formatted(), card.unit);
        s.push_str(line.trim_end());
        s.push('\n');
    }
    s
}

pub fn format_journal(journal: &JournalTable) -> String {
    if journal.is_empty() {
        return "  (no journal columns in data)\n".to_string();
    }
    let mut s = String::new();
    let mut header = format!("  {:<16}", "Stage");
    for h in &journal.headers {
        header.push_str(&format!(" {h:>11}"));
    }
    s.push_str(&header);
    s.push('\n');
    s.push_str(&format!("  {}\n", "-".repeat(16 + 12 * journal.headers.len())));
    for row in &journal.rows {
        let mut line = format!("  {:<16}", truncate(&row.stage, 16));
        for v in &row.values {
            match v {
                Some(v) => line.push_str(&format!(" {v:>11.2}")),
                None => line.push_str(&format!(" {:>11}", "-")),
            }
        }
        s.push_str(&line);
        s.push('\n');
    }
    s
}

pub fn format_prediction(profile: &ProductProfile, predictor: &Predictor, prediction: &Prediction) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "  {} at t = {:.1} h: {:.2}{}\n",
        profile.target_label,
        prediction.time_hours,
        prediction.value,
        unit_suffix(profile.target_unit)
    ));
    s.push_str(&format!(
        "  Status: {} ({:?})\n",
        prediction.status.label().to_uppercase(),
        prediction.status.severity()
    ));
    s.push_str(&format!("  Model: {}\n", predictor.formula(profile.target_label)));
    if let Predictor::Theoretical { reason, .. } = predictor {
        s.push_str(&format!("  ! Theoretical model in use ({reason})\n"));
    }
    s
}

/// Model comparison table plus the accuracy verdict.
pub fn format_models(profile: &ProductProfile, comparison: &Result<ModelComparison, ModelError>) -> String {
    let cmp = match comparison {
        Ok(cmp) => cmp,
        Err(err) => return format!("Model comparison unavailable: {err}\n"),
    };

    let mut s = String::new();
    s.push_str("Model diagnostics:\n");
    for kind in [ModelKind::Linear, ModelKind::Logarithmic] {
        let fit = cmp.get(kind);
        let chosen = if kind == cmp.best { "*" } else { " " };
        s.push_str(&format!(
            "{chosen} {:<12} MAE={:.4} RMSE={:.4} R2={:.4} n={}\n",
            kind.display_name(),
            fit.quality.mae,
            fit.quality.rmse,
            fit.quality.r2,
            fit.quality.n
        ));
    }

    let log = &cmp.logarithmic;
    s.push_str(&format!(
        "\nProduction model: {}\n",
        crate::models::formula(ModelKind::Logarithmic, profile.target_label, log.model.intercept, log.model.slope)
    ));
    if cmp.meets_accuracy() {
        s.push_str(&format!(
            "Accuracy criterion met (MAE {:.4} <= {}).\n",
            log.quality.mae, cmp.accuracy_limit
        ));
    } else {
        s.push_str(&format!(
            "Refinement required (MAE {:.4} > {}).\n",
            log.quality.mae, cmp.accuracy_limit
        ));
    }
    s
}

pub fn format_optimization(profile: &ProductProfile, opt: &Optimization) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Target {}: {:.2}{} (observed range [{:.2}, {:.2}])\n",
        profile.target_label,
        opt.target,
        unit_suffix(profile.target_unit),
        opt.observed.0,
        opt.observed.1
    ));
    s.push_str(&format!(
        "Model: {}\n",
        crate::models::formula(opt.model.kind, profile.target_label, opt.model.intercept, opt.model.slope)
    ));
    match &opt.time_hours {
        Ok(t) => s.push_str(&format!("Time to target: {t:.2} h\n")),
        Err(ModelError::NoTimeDependence { .. }) => s.push_str("The model sees no time dependence.\n"),
        Err(err) => s.push_str(&format!("Time to target unavailable: {err}\n")),
    }
    s
}

pub fn format_energy(profile: &ProductProfile, e: &EnergyBalance) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Batch: {:.0} l ({:.1} kg), inlet {:.1} °C, {}\n",
        e.volume_l,
        e.mass_kg,
        e.inlet_c,
        profile.kind.display_name()
    ));
    s.push_str("\nPasteurization:\n");
    s.push_str(&format!("  Target temperature  {:.1} °C\n", e.pasteurization_c));
    s.push_str(&format!("  Energy              {:.2} kWh\n", e.heating_kwh));
    s.push_str("  Q_heat = m · cp · (T_past - T_start)\n");
    s.push_str("\nCooling:\n");
    s.push_str(&format!("  T after cooling     {:.1} °C\n", e.cooled_c));
    s.push_str(&format!("  Heat removed        {:.2} kWh\n", e.cooling_kwh));
    s.push_str("  Q_cool = m · cp · (T_past - T_ferm)\n");
    s
}

pub fn format_experiments(set: &ExperimentSet, target: f64) -> String {
    let mut s = String::new();
    s.push_str(&format!("{}\n\n", set.title));

    for curve in set.curves {
        let r2 = curve
            .r2
            .map(|r| format!("R² = {r:.3}"))
            .unwrap_or_else(|| "R² n/a".to_string());
        s.push_str(&format!(
            "  {:<30} {}  ({r2})\n",
            curve.label,
            curve.shape.formula(set.value_label)
        ));
    }

    s.push_str("\nForecast table:\n");
    let mut header = format!("  {:>8}", "Time (h)");
    for curve in set.curves {
        header.push_str(&format!(" {:>12}", truncate(curve.label, 12)));
    }
    s.push_str(&header);
    s.push('\n');
    for (t, row) in set.comparison_table() {
        let mut line = format!("  {t:>8.0}");
        for v in row {
            line.push_str(&format!(" {v:>12.3}"));
        }
        s.push_str(&line);
        s.push('\n');
    }

    s.push_str(&format!(
        "\nTime to reach {} = {target} (window [{}, {}] h):\n",
        set.value_label, set.window.0, set.window.1
    ));
    for (curve, t) in set.curves.iter().zip(set.time_to_target(target)) {
        match t {
            Some(t) => s.push_str(&format!("  {:<30} {t:.2} h\n", curve.label)),
            None => s.push_str(&format!("  {:<30} not reached in window\n", curve.label)),
        }
    }
    s
}

pub fn format_surface(surface: &ResponseSurface) -> String {
    let mut s = String::new();
    let (min, max) = (surface.min(), surface.max());
    s.push_str(&format!("{}\n", surface.spec.title));
    s.push_str(&format!(
        "Grid: {}×{} | dose [{}, {}] % | time [{}, {}] h\n",
        surface.doses.len(),
        surface.times.len(),
        surface.spec.dose.0,
        surface.spec.dose.1,
        surface.spec.time.0,
        surface.spec.time.1
    ));
    s.push_str(&format!(
        "Min {} = {:.3} at dose {:.2} %, t = {:.2} h\n",
        surface.spec.value_label, min.value, min.dose, min.time
    ));
    s.push_str(&format!(
        "Max {} = {:.3} at dose {:.2} %, t = {:.2} h\n\n",
        surface.spec.value_label, max.value, max.dose, max.time
    ));
    s.push_str(&surface.heat_map());
    s
}

pub fn format_state_vector() -> String {
    let mut s = String::from("Process state vector (14 controlled variables):\n");
    for (i, name) in STATE_VECTOR.iter().enumerate() {
        s.push_str(&format!("  {:>2}. {name}\n", i + 1));
    }
    s
}

pub fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() { String::new() } else { format!(" {unit}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AYRAN, FitQuality, FitResult, FittedModel, ProductKind};
    use crate::energy::energy_balance;
    use crate::surface::experiment_set;

    fn fit(kind: ModelKind, mae: f64) -> FitResult {
        FitResult {
            model: FittedModel {
                kind,
                intercept: 5.98,
                slope: -0.7,
            },
            quality: FitQuality {
                mae,
                rmse: mae,
                r2: 0.9,
                n: 10,
            },
        }
    }

    #[test]
    fn models_report_marks_best_and_verdict() {
        let cmp = ModelComparison {
            linear: fit(ModelKind::Linear, 0.2),
            logarithmic: fit(ModelKind::Logarithmic, 0.03),
            best: ModelKind::Logarithmic,
            accuracy_limit: 0.05,
        };
        let txt = format_models(&AYRAN, &Ok(cmp));
        assert!(txt.contains("* Logarithmic"));
        assert!(txt.contains("pH = 5.98 -0.700 · ln(t+1)"));
        assert!(txt.contains("Accuracy criterion met"));
    }

    #[test]
    fn energy_report_shows_kwh() {
        let e = energy_balance(&AYRAN, 1000.0, 10.0).unwrap();
        let txt = format_energy(&AYRAN, &e);
        assert!(txt.contains("82.57 kWh"));
    }

    #[test]
    fn experiments_report_has_table() {
        let txt = format_experiments(experiment_set(ProductKind::Ayran), 4.6);
        assert!(txt.contains("4.518"));
        assert!(txt.contains("not reached in window"));
    }

    #[test]
    fn state_vector_lists_fourteen() {
        let txt = format_state_vector();
        assert_eq!(txt.lines().count(), 15);
        assert!(txt.contains("14. Duration (h)"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Homogenization stage", 8), "Homogen.");
        assert_eq!(truncate("Drying", 8), "Drying");
    }
}
