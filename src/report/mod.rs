//! Dashboard report data (KPI cards, process journal) and text formatting.

pub mod format;

use std::collections::BTreeMap;

use crate::data::{Dataset, Selection};
use crate::domain::{DURATION_COLUMN, KpiSpec, ProductProfile};

pub use format::*;

/// One KPI card: mean of a column over the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub unit: &'static str,
    pub value: f64,
}

impl KpiCard {
    pub fn formatted(&self) -> String {
        format_kpi_value(self.value)
    }
}

/// KPI cards of a product; a missing column shows as 0.
pub fn kpi_cards(selection: &Selection<'_>, profile: &ProductProfile) -> Vec<KpiCard> {
    profile
        .kpis
        .iter()
        .map(|&KpiSpec { column, title, unit }| KpiCard {
            title,
            unit,
            value: selection.column_mean(column).unwrap_or(0.0),
        })
        .collect()
}

/// Values above 1000 are grouped in thousands with spaces and no decimals.
pub fn format_kpi_value(value: f64) -> String {
    if value > 1000.0 {
        group_thousands(&format!("{value:.0}"))
    } else {
        format!("{value:.2}")
    }
}

fn group_thousands(digits: &str) -> String {
    let n = digits.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Journal columns in display order, with their headers.
pub const JOURNAL_COLUMNS: [(&str, &str); 4] = [
    (DURATION_COLUMN, "Time (h)"),
    ("temperature_c", "Temp. (°C)"),
    ("ph", "pH"),
    ("влага", "Moisture %"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct JournalRow {
    pub stage: String,
    /// Means rounded to 2 decimals, one per journal column; `None` when no row has a value.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JournalTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<JournalRow>,
}

impl JournalTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Process journal: stage means of the journal columns present in the dataset.
///
/// Without a `process_stage` column the table has a single "Production" row.
/// Rows without a stage value are left out of the grouped table.
pub fn process_journal(dataset: &Dataset, selection: &Selection<'_>) -> JournalTable {
    let columns: Vec<(&str, &'static str)> = JOURNAL_COLUMNS
        .iter()
        .copied()
        .filter(|(c, _)| dataset.has_column(c))
        .collect();
    if columns.is_empty() {
        return JournalTable::default();
    }

    let mean_row = |stage: String, records: &[&crate::data::Record]| JournalRow {
        stage,
        values: columns
            .iter()
            .map(|(c, _)| {
                let (sum, n) = records
                    .iter()
                    .filter_map(|r| r.value(c))
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                (n > 0).then(|| round2(sum / n as f64))
            })
            .collect(),
    };

    let rows = if dataset.has_column(crate::domain::STAGE_COLUMN) {
        let mut groups: BTreeMap<&str, Vec<&crate::data::Record>> = BTreeMap::new();
        for &r in &selection.records {
            if let Some(stage) = r.stage.as_deref() {
                groups.entry(stage).or_default().push(r);
            }
        }
        groups
            .into_iter()
            .map(|(stage, records)| mean_row(stage.to_string(), &records))
            .collect()
    } else {
        vec![mean_row("Production".to_string(), &selection.records)]
    };

    JournalTable {
        headers: columns.iter().map(|&(_, h)| h).collect(),
        rows,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::data::Record;
    use crate::domain::AYRAN;

    fn record(stage: Option<&str>, t: f64, ph: f64) -> Record {
        let mut values = HashMap::new();
        values.insert(DURATION_COLUMN.to_string(), t);
        values.insert("ph".to_string(), ph);
        Record {
            line: 0,
            product: "Айран".to_string(),
            experiment: None,
            stage: stage.map(str::to_string),
            values,
        }
    }

    fn dataset(with_stage: bool) -> Dataset {
        let mut columns = vec!["productname".to_string(), DURATION_COLUMN.to_string(), "ph".to_string()];
        if with_stage {
            columns.push("process_stage".to_string());
        }
        let stage = |s| if with_stage { Some(s) } else { None };
        Dataset {
            source: PathBuf::from("t.csv"),
            columns,
            product_column: "productname".to_string(),
            records: vec![
                record(stage("Reception"), 0.0, 6.0),
                record(stage("Fermentation"), 2.0, 5.0),
                record(stage("Fermentation"), 4.0, 4.56),
            ],
            row_errors: Vec::new(),
            rows_read: 3,
        }
    }

    #[test]
    fn kpi_formatting() {
        assert_eq!(format_kpi_value(1234.5), "1 234");
        assert_eq!(format_kpi_value(4.567), "4.57");
        assert_eq!(format_kpi_value(1000.0), "1000.00");
        assert_eq!(format_kpi_value(12_345_678.0), "12 345 678");
    }

    #[test]
    fn missing_kpi_columns_show_zero() {
        let ds = dataset(false);
        let sel = ds.select("Айран", None).unwrap();
        let cards = kpi_cards(&sel, &AYRAN);
        assert_eq!(cards.len(), 6);
        assert!((cards[0].value - (6.0 + 5.0 + 4.56) / 3.0).abs() < 1e-12);
        assert_eq!(cards[1].value, 0.0);
        assert_eq!(cards[1].formatted(), "0.00");
    }

    #[test]
    fn journal_groups_by_sorted_stage() {
        let ds = dataset(true);
        let sel = ds.select("Айран", None).unwrap();
        let journal = process_journal(&ds, &sel);
        assert_eq!(journal.headers, vec!["Time (h)", "pH"]);
        assert_eq!(journal.rows.len(), 2);
        assert_eq!(journal.rows[0].stage, "Fermentation");
        assert_eq!(journal.rows[0].values, vec![Some(3.0), Some(4.78)]);
        assert_eq!(journal.rows[1].stage, "Reception");
    }

    #[test]
    fn journal_without_stage_is_single_row() {
        let ds = dataset(false);
        let sel = ds.select("Айран", None).unwrap();
        let journal = process_journal(&ds, &sel);
        assert_eq!(journal.rows.len(), 1);
        assert_eq!(journal.rows[0].stage, "Production");
        assert_eq!(journal.rows[0].values[0], Some(2.0));
    }
}
