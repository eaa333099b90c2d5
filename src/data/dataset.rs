//! In-memory dataset and product/experiment selections.
//!
//! A `Dataset` is loaded once (see `io::ingest`) and treated as immutable.
//! Every view of the dashboard works on a `Selection`: the rows of one
//! product, optionally narrowed to one experiment type.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::domain::{DURATION_COLUMN, ProductKind, Sample};
use crate::error::AppError;

/// One CSV row after normalization.
///
/// Numeric cells live in `values`; missing or unparseable cells are absent.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// 1-based line number in the source file.
    pub line: usize,
    pub product: String,
    pub experiment: Option<String>,
    pub stage: Option<String>,
    pub values: HashMap<String, f64>,
}

impl Record {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn duration(&self) -> Option<f64> {
        self.value(DURATION_COLUMN)
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed dataset plus ingest diagnostics.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    /// Normalized column names, in file order.
    pub columns: Vec<String>,
    /// Which column held the product name.
    pub product_column: String,
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Distinct product names, sorted.
    pub fn products(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.product.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Default product: the last ayran line in sorted order, else the first product.
    pub fn default_product(&self) -> Option<String> {
        let products = self.products();
        products
            .iter()
            .rev()
            .find(|p| ProductKind::from_product_name(p) == ProductKind::Ayran)
            .or_else(|| products.first())
            .cloned()
    }

    /// Distinct experiment types recorded for a product, sorted.
    pub fn experiment_types(&self, product: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.product == product)
            .filter_map(|r| r.experiment.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Select the rows of one product, optionally one experiment type.
    pub fn select(&self, product: &str, experiment: Option<&str>) -> Result<Selection<'_>, AppError> {
        let products = self.products();
        if !products.iter().any(|p| p == product) {
            return Err(AppError::new(
                2,
                format!("Unknown product '{product}'. Available: {}", products.join(", ")),
            ));
        }

        if let Some(exp) = experiment {
            let types = self.experiment_types(product);
            if !types.iter().any(|t| t == exp) {
                return Err(AppError::new(
                    2,
                    format!(
                        "Unknown experiment type '{exp}' for '{product}'. Available: {}",
                        if types.is_empty() { "-".to_string() } else { types.join(", ") }
                    ),
                ));
            }
        }

        let records = self
            .records
            .iter()
            .filter(|r| r.product == product)
            .filter(|r| experiment.is_none_or(|exp| r.experiment.as_deref() == Some(exp)))
            .collect();

        Ok(Selection {
            product: product.to_string(),
            kind: ProductKind::from_product_name(product),
            experiment: experiment.map(str::to_string),
            records,
        })
    }
}

/// Rows of one product (and optional experiment type).
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub product: String,
    pub kind: ProductKind,
    pub experiment: Option<String>,
    pub records: Vec<&'a Record>,
}

impl Selection<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(duration_hours, column)` pairs for rows where both are present.
    pub fn samples(&self, column: &str) -> Vec<Sample> {
        self.records
            .iter()
            .filter_map(|r| Some(Sample::new(r.duration()?, r.value(column)?)))
            .collect()
    }

    /// Training set for the product's quality column.
    pub fn quality_samples(&self) -> Vec<Sample> {
        self.samples(self.kind.profile().target_column)
    }

    /// Mean of a numeric column over rows where it is present.
    pub fn column_mean(&self, column: &str) -> Option<f64> {
        let (sum, n) = self
            .records
            .iter()
            .filter_map(|r| r.value(column))
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Observed `[min, max]` of a numeric column.
    pub fn column_range(&self, column: &str) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.value(column))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    pub fn max_duration(&self) -> Option<f64> {
        self.column_range(DURATION_COLUMN).map(|(_, hi)| hi)
    }

    /// The row whose duration is closest to `t` (first one on ties).
    pub fn nearest_record(&self, t: f64) -> Option<&Record> {
        let mut best: Option<(&Record, f64)> = None;
        for &r in &self.records {
            let Some(d) = r.duration() else { continue };
            let dist = (d - t).abs();
            if best.is_none_or(|(_, b)| dist < b) {
                best = Some((r, dist));
            }
        }
        best.map(|(r, _)| r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, product: &str, experiment: &str, t: f64, ph: Option<f64>) -> Record {
        let mut values = HashMap::new();
        values.insert(DURATION_COLUMN.to_string(), t);
        if let Some(ph) = ph {
            values.insert("ph".to_string(), ph);
        }
        Record {
            line,
            product: product.to_string(),
            experiment: Some(experiment.to_string()),
            stage: None,
            values,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            source: PathBuf::from("test.csv"),
            columns: vec!["productname".into(), DURATION_COLUMN.into(), "ph".into()],
            product_column: "productname".to_string(),
            records: vec![
                record(2, "Сары ірімшік", "Контроль", 0.0, Some(6.5)),
                record(3, "Айран", "Контроль", 0.0, Some(6.0)),
                record(4, "Айран", "Опыт 1", 2.0, Some(5.2)),
                record(5, "Айран", "Опыт 1", 4.0, None),
                record(6, "Айран", "Контроль", 4.0, Some(4.7)),
            ],
            row_errors: Vec::new(),
            rows_read: 5,
        }
    }

    #[test]
    fn products_are_sorted_and_default_to_ayran() {
        let ds = dataset();
        assert_eq!(ds.products(), vec!["Айран".to_string(), "Сары ірімшік".to_string()]);
        assert_eq!(ds.default_product().as_deref(), Some("Айран"));
        assert_eq!(ds.experiment_types("Айран"), vec!["Контроль", "Опыт 1"]);
    }

    #[test]
    fn selection_filters_by_experiment() {
        let ds = dataset();
        let all = ds.select("Айран", None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.kind, ProductKind::Ayran);

        let exp = ds.select("Айран", Some("Опыт 1")).unwrap();
        assert_eq!(exp.len(), 2);
        // Missing pH drops the row from the training set.
        assert_eq!(exp.quality_samples(), vec![Sample::new(2.0, 5.2)]);
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let ds = dataset();
        assert_eq!(ds.select("Kefir", None).unwrap_err().exit_code(), 2);
        assert_eq!(ds.select("Айран", Some("Опыт 9")).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn column_stats() {
        let ds = dataset();
        let sel = ds.select("Айран", None).unwrap();
        let mean = sel.column_mean("ph").unwrap();
        assert!((mean - (6.0 + 5.2 + 4.7) / 3.0).abs() < 1e-12);
        assert_eq!(sel.column_range("ph"), Some((4.7, 6.0)));
        assert_eq!(sel.column_mean("fat_pct"), None);
        assert_eq!(sel.max_duration(), Some(4.0));
    }

    #[test]
    fn nearest_record_prefers_first_on_ties() {
        let ds = dataset();
        let sel = ds.select("Айран", None).unwrap();
        assert_eq!(sel.nearest_record(0.9).map(|r| r.line), Some(3));
        assert_eq!(sel.nearest_record(3.5).map(|r| r.line), Some(5));
        assert_eq!(sel.nearest_record(1.0).map(|r| r.line), Some(3));
    }
}
