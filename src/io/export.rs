//! Export per-sample predictions to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::SampleResidual;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct PredictionRow<'a> {
    product: &'a str,
    experiment: &'a str,
    model: &'a str,
    duration_hours: f64,
    observed: f64,
    fitted: f64,
    residual: f64,
}

/// Context written on every exported row.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub product: &'a str,
    /// `None` means all batches.
    pub experiment: Option<&'a str>,
    pub model: &'a str,
}

/// Write per-sample predictions to a CSV file.
pub fn write_predictions_csv(path: &Path, residuals: &[SampleResidual], ctx: ExportContext<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_predictions(file, residuals, ctx)
}

pub fn write_predictions<W: Write>(writer: W, residuals: &[SampleResidual], ctx: ExportContext<'_>) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for r in residuals {
        out.serialize(PredictionRow {
            product: ctx.product,
            experiment: ctx.experiment.unwrap_or("all"),
            model: ctx.model,
            duration_hours: r.sample.elapsed,
            observed: r.sample.value,
            fitted: round4(r.fitted),
            residual: round4(r.residual),
        })
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn round4(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sample;

    #[test]
    fn writes_header_and_rows() {
        let residuals = [SampleResidual {
            sample: Sample::new(2.0, 5.1),
            fitted: 5.0,
            residual: 0.1,
        }];
        let ctx = ExportContext {
            product: "Айран",
            experiment: None,
            model: "logarithmic",
        };
        let mut buf = Vec::new();
        write_predictions(&mut buf, &residuals, ctx).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("product,experiment,model,duration_hours,observed,fitted,residual")
        );
        assert_eq!(lines.next(), Some("Айран,all,logarithmic,2.0,5.1,5.0,0.1"));
    }
}
