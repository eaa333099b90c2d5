//! CSV ingest and normalization.
//!
//! This module turns a measurement CSV into a `Dataset`:
//!
//! - headers are trimmed, lower-cased (Cyrillic included) and BOM-stripped
//! - the product column (`productname` or `product_name`) is required
//! - `experiment_type` / `process_stage` are kept as text, every other cell is
//!   parsed as a finite number or left absent
//! - rows that cannot be read are skipped and reported, never fatal
//!
//! No fitting logic lives here.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::data::{Dataset, Record, RowError};
use crate::domain::{EXPERIMENT_COLUMN, PRODUCT_COLUMNS, STAGE_COLUMN};
use crate::error::AppError;

/// Environment variable (or `.env` entry) naming the dataset file.
pub const DATA_ENV_VAR: &str = "TWIN_DATA";

/// Default dataset files, in lookup order.
pub const DEFAULT_DATA_FILES: [&str; 2] = ["Scientific_Data_Extended.csv", "Scientific_Data.csv"];

/// Resolve the dataset path from the CLI flag, `TWIN_DATA`, or the default names.
pub fn resolve_data_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    let env_value = std::env::var_os(DATA_ENV_VAR).map(PathBuf::from);
    resolve_data_path_from(explicit, env_value, Path::new("."))
}

/// Path resolution with the environment value and working directory passed in.
pub fn resolve_data_path_from(
    explicit: Option<&Path>,
    env_value: Option<PathBuf>,
    base_dir: &Path,
) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    for name in DEFAULT_DATA_FILES {
        let candidate = base_dir.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(AppError::new(
        2,
        format!(
            "No dataset found ({} or {}). Pass --data, set {DATA_ENV_VAR}, or run `twin generate`.",
            DEFAULT_DATA_FILES[0], DEFAULT_DATA_FILES[1]
        ),
    ))
}

/// Load and normalize a measurement CSV.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = read_dataset(file, path)?;

    tracing::info!(
        path = %path.display(),
        rows = dataset.rows_read,
        records = dataset.records.len(),
        skipped = dataset.row_errors.len(),
        "dataset loaded"
    );
    for err in dataset.row_errors.iter().take(5) {
        tracing::warn!(line = err.line, "{}", err.message);
    }
    Ok(dataset)
}

/// Parse a measurement CSV from any reader; `source` is only recorded.
pub fn read_dataset<R: Read>(reader: R, source: &Path) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let header_map = build_header_map(&columns);

    let product_column = PRODUCT_COLUMNS
        .iter()
        .find(|c| header_map.contains_key(**c))
        .map(|c| c.to_string())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing required column: `{}`", PRODUCT_COLUMNS.join("` or `")),
            )
        })?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns, &header_map, &product_column, line) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(Dataset {
        source: source.to_path_buf(),
        columns,
        product_column,
        records,
        row_errors,
        rows_read,
    })
}

fn parse_row(
    record: &StringRecord,
    columns: &[String],
    header_map: &HashMap<String, usize>,
    product_column: &str,
    line: usize,
) -> Result<Record, String> {
    let product = get_optional(record, header_map, product_column)
        .ok_or_else(|| format!("Missing `{product_column}` value"))?
        .to_string();

    let mut values = HashMap::new();
    for (idx, name) in columns.iter().enumerate() {
        if is_text_column(name, product_column) {
            continue;
        }
        if let Some(v) = parse_opt_f64(record.get(idx).map(str::trim)) {
            values.insert(name.clone(), v);
        }
    }

    Ok(Record {
        line,
        product,
        experiment: get_optional(record, header_map, EXPERIMENT_COLUMN).map(str::to_string),
        stage: get_optional(record, header_map, STAGE_COLUMN).map(str::to_string),
        values,
    })
}

fn is_text_column(name: &str, product_column: &str) -> bool {
    name == product_column || name == EXPERIMENT_COLUMN || name == STAGE_COLUMN
}

/// First occurrence wins for duplicated headers.
fn build_header_map(columns: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in columns.iter().enumerate() {
        map.entry(name.clone()).or_insert(idx);
    }
    map
}

pub fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the product column goes missing.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s.filter(|s| !s.is_empty())?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<Dataset, AppError> {
        read_dataset(csv.as_bytes(), Path::new("inline.csv"))
    }

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header_name("\u{feff}ProductName "), "productname");
        assert_eq!(normalize_header_name(" ВЛАГА"), "влага");
        assert_eq!(normalize_header_name("Duration_Hours"), "duration_hours");
    }

    #[test]
    fn reads_rows_with_text_and_numeric_columns() {
        let ds = parse(concat!(
            "\u{feff}ProductName,Experiment_Type,Process_Stage,Duration_Hours,pH,Влага\n",
            "Айран,Контроль,Fermentation,2.0,5.1,\n",
            "Айран,Опыт 1,Fermentation,4.0,abc,89.0\n",
            ",Контроль,Fermentation,1.0,5.5,\n",
        ))
        .unwrap();

        assert_eq!(ds.product_column, "productname");
        assert!(ds.has_column("влага"));
        assert_eq!(ds.rows_read, 3);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.row_errors.len(), 1);
        assert_eq!(ds.row_errors[0].line, 4);

        let first = &ds.records[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.experiment.as_deref(), Some("Контроль"));
        assert_eq!(first.stage.as_deref(), Some("Fermentation"));
        assert_eq!(first.value("ph"), Some(5.1));
        assert_eq!(first.value("влага"), None);

        // Unparseable cells are absent rather than fatal.
        assert_eq!(ds.records[1].value("ph"), None);
        assert_eq!(ds.records[1].value("влага"), Some(89.0));
    }

    #[test]
    fn product_name_fallback_column() {
        let ds = parse("product_name,duration_hours\nKefir,1\n").unwrap();
        assert_eq!(ds.product_column, "product_name");
        assert_eq!(ds.records[0].product, "Kefir");
        assert_eq!(ds.records[0].experiment, None);
    }

    #[test]
    fn missing_product_column_is_usage_error() {
        let err = parse("name,duration_hours\nx,1\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn non_finite_numbers_are_dropped() {
        let ds = parse("productname,ph\nA,inf\nB,NaN\n").unwrap();
        assert!(ds.records.iter().all(|r| r.value("ph").is_none()));
    }

    #[test]
    fn path_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = Path::new("given.csv");

        let p = resolve_data_path_from(Some(explicit), Some("env.csv".into()), dir.path()).unwrap();
        assert_eq!(p, PathBuf::from("given.csv"));

        let p = resolve_data_path_from(None, Some("env.csv".into()), dir.path()).unwrap();
        assert_eq!(p, PathBuf::from("env.csv"));

        assert_eq!(resolve_data_path_from(None, None, dir.path()).unwrap_err().exit_code(), 2);

        std::fs::write(dir.path().join("Scientific_Data.csv"), "productname\n").unwrap();
        let p = resolve_data_path_from(None, None, dir.path()).unwrap();
        assert!(p.ends_with("Scientific_Data.csv"));

        std::fs::write(dir.path().join("Scientific_Data_Extended.csv"), "productname\n").unwrap();
        let p = resolve_data_path_from(None, None, dir.path()).unwrap();
        assert!(p.ends_with("Scientific_Data_Extended.csv"));
    }
}
