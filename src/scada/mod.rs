//! SCADA line snapshot: process units, their status and tag readings at a
//! given process time.
//!
//! Stage windows are presentation rules only. They decide which unit is lit,
//! and the tag readings come from the measurement row nearest in time.

use std::fmt;

use crate::data::{Record, Selection};
use crate::domain::ProductKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Run,
    Heat,
    Off,
}

impl UnitStatus {
    pub fn label(self) -> &'static str {
        match self {
            UnitStatus::Run => "RUN",
            UnitStatus::Heat => "HEAT",
            UnitStatus::Off => "OFF",
        }
    }
}

/// Process stage of a product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reception,
    Homogenization,
    Pasteurization,
    Fermentation,
    Bottling,
    Mixing,
    Cooking,
    Pressing,
    Drying,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Reception => "Reception",
            Stage::Homogenization => "Homogenization",
            Stage::Pasteurization => "Pasteurization",
            Stage::Fermentation => "Fermentation",
            Stage::Bottling => "Bottling",
            Stage::Mixing => "Mixing",
            Stage::Cooking => "Cooking",
            Stage::Pressing => "Pressing",
            Stage::Drying => "Drying",
        }
    }
}

/// Stage active at `t` hours.
///
/// Ayran has a gap at `[1.5, 2)` (cooling to fermentation temperature) where
/// no unit runs.
pub fn stage_at(product: ProductKind, t: f64) -> Option<Stage> {
    match product {
        ProductKind::Ayran => match t {
            t if (0.0..0.5).contains(&t) => Some(Stage::Reception),
            t if (0.5..1.0).contains(&t) => Some(Stage::Homogenization),
            t if (1.0..1.5).contains(&t) => Some(Stage::Pasteurization),
            t if (2.0..8.0).contains(&t) => Some(Stage::Fermentation),
            t if t >= 8.0 => Some(Stage::Bottling),
            _ => None,
        },
        ProductKind::Irimshik => match t {
            t if t < 1.0 => Some(Stage::Mixing),
            t if t < 5.0 => Some(Stage::Cooking),
            t if t < 6.0 => Some(Stage::Pressing),
            _ => Some(Stage::Drying),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Number(f64),
    Text(&'static str),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Number(v) if *v < 100.0 => write!(f, "{v:.2}"),
            TagValue::Number(v) => write!(f, "{v:.1}"),
            TagValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: &'static str,
    pub value: TagValue,
    pub unit: &'static str,
}

fn num(name: &'static str, value: f64, unit: &'static str) -> Tag {
    Tag {
        name,
        value: TagValue::Number(value),
        unit,
    }
}

fn text(name: &'static str, value: &'static str) -> Tag {
    Tag {
        name,
        value: TagValue::Text(value),
        unit: "",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUnit {
    pub title: &'static str,
    pub status: UnitStatus,
    pub active: bool,
    pub tags: Vec<Tag>,
}

/// Sensor readings taken from one measurement row, with line defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub temperature: f64,
    pub ph: f64,
    pub moisture: f64,
    pub pressure: f64,
    pub viscosity: f64,
    pub fat: f64,
    pub acidity: f64,
}

impl Readings {
    pub fn from_record(record: Option<&Record>) -> Self {
        let get = |column: &str, default: f64| {
            record.and_then(|r| r.value(column)).unwrap_or(default)
        };
        let ph = get("ph", 6.6);
        Self {
            temperature: get("temperature_c", 20.0),
            ph,
            moisture: get("влага", 88.0),
            pressure: get("pressure_mpa", 0.0),
            viscosity: get("viscosity_mpa_s", 1.5),
            fat: get("fat_pct", 3.2),
            acidity: get("кислотность", (7.0 - ph) * 40.0),
        }
    }
}

/// Units plus the flow flag of each pipe between consecutive units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessLine {
    pub units: Vec<ProcessUnit>,
    pub pipes: Vec<bool>,
}

impl ProcessLine {
    pub fn active_unit(&self) -> Option<&ProcessUnit> {
        self.units.iter().find(|u| u.active)
    }
}

fn run_if(active: bool) -> UnitStatus {
    if active { UnitStatus::Run } else { UnitStatus::Off }
}

/// Build the process line of a product at time `t`.
pub fn build_line(product: ProductKind, t: f64, r: &Readings) -> ProcessLine {
    let stage = stage_at(product, t);
    let is = |s: Stage| stage == Some(s);

    match product {
        ProductKind::Ayran => {
            let (s1, s2, s3, s4, s5) = (
                is(Stage::Reception),
                is(Stage::Homogenization),
                is(Stage::Pasteurization),
                is(Stage::Fermentation),
                is(Stage::Bottling),
            );
            let tank_temp = if s1 { 42.0 } else if s2 { 65.0 } else { 20.0 };
            let pressure = match (s2, r.pressure > 0.0) {
                (true, true) => r.pressure,
                (true, false) => 12.5,
                _ => 0.0,
            };
            let units = vec![
                ProcessUnit {
                    title: "Normalization tank",
                    status: run_if(s1),
                    active: s1,
                    tags: vec![
                        num("Level", 85.0 - t * 2.0, "%"),
                        num("Temperature", tank_temp, "°C"),
                        num("Fat", r.fat, "%"),
                        text("Agitator", if s1 { "ON" } else { "OFF" }),
                    ],
                },
                ProcessUnit {
                    title: "Homogenizer",
                    status: run_if(s2),
                    active: s2,
                    tags: vec![
                        num("Pressure", pressure, "MPa"),
                        num("Temperature", if s2 { 65.0 } else { 40.0 }, "°C"),
                        num("Power", if s2 { 45.0 } else { 0.0 }, "kW"),
                    ],
                },
                ProcessUnit {
                    title: "Pasteurizer",
                    status: run_if(s3),
                    active: s3,
                    tags: vec![
                        num("T outlet", if s3 { 84.0 } else { 65.0 }, "°C"),
                        num("Steam valve", if s3 { 85.0 } else { 0.0 }, "%"),
                        num("Flow", if s3 { 5000.0 } else { 0.0 }, "l/h"),
                    ],
                },
                ProcessUnit {
                    title: "Fermentation tank",
                    status: run_if(s4),
                    active: s4,
                    tags: vec![
                        num("Product pH", r.ph, ""),
                        num("Acidity", r.acidity, "°T"),
                        num("Temperature", r.temperature, "°C"),
                        num("Viscosity", r.viscosity, "mPa·s"),
                    ],
                },
                ProcessUnit {
                    title: "Bottling line",
                    status: run_if(s5),
                    active: s5,
                    tags: vec![
                        num("Speed", if s5 { 6000.0 } else { 0.0 }, "bottles/h"),
                        num("Counter", if s5 { (t * 1200.0).trunc() } else { 0.0 }, "pcs"),
                        num("T product", if s5 { 4.0 } else { 20.0 }, "°C"),
                    ],
                },
            ];
            // The pipe out of the fermentation tank lights with the bottling stage.
            ProcessLine {
                units,
                pipes: vec![s1, s2, s3, s5],
            }
        }
        ProductKind::Irimshik => {
            let (s1, s2, s3, s4) = (
                is(Stage::Mixing),
                is(Stage::Cooking),
                is(Stage::Pressing),
                is(Stage::Drying),
            );
            let cook_temp = if s2 { 96.5 } else if s1 { 34.0 } else { 80.0 };
            let units = vec![
                ProcessUnit {
                    title: "Cheese vat",
                    status: run_if(s1),
                    active: s1,
                    tags: vec![
                        num("T mix", if s1 { 34.0 } else { 20.0 }, "°C"),
                        num("Milk pH", r.ph, ""),
                        text("Enzyme", if t > 0.2 { "ADDED" } else { "WAITING" }),
                    ],
                },
                ProcessUnit {
                    title: "Cooking kettle",
                    status: if s2 { UnitStatus::Heat } else { UnitStatus::Off },
                    active: s2,
                    tags: vec![
                        num("T product", cook_temp, "°C"),
                        num("Steam pressure", if s2 { 0.6 } else { 0.0 }, "MPa"),
                        text("Colour sensor", if t > 3.0 { "YELLOW" } else { "WHITE" }),
                    ],
                },
                ProcessUnit {
                    title: "Press cart",
                    status: run_if(s3),
                    active: s3,
                    tags: vec![
                        num("Force", if s3 { 2.5 } else { 0.0 }, "bar"),
                        num("Whey drain", if s3 { 50.0 } else { 0.0 }, "l/min"),
                    ],
                },
                ProcessUnit {
                    title: "Drying chamber",
                    status: run_if(s4),
                    active: s4,
                    tags: vec![
                        num("T air", if s4 { 45.0 } else { 20.0 }, "°C"),
                        num("Moisture", r.moisture, "%"),
                        num("Target", 18.0, "%"),
                    ],
                },
            ];
            ProcessLine {
                units,
                pipes: vec![s1, s2, s3],
            }
        }
    }
}

/// Batch number shown on the dispatcher panel.
pub fn batch_number(t: f64) -> i64 {
    (t * 100.0) as i64 + 1000
}

/// Everything the SCADA view shows for one product at one time.
#[derive(Debug, Clone)]
pub struct ScadaSnapshot {
    pub product: String,
    pub kind: ProductKind,
    pub time_hours: f64,
    pub batch_number: i64,
    pub experiment: String,
    pub stage: String,
    pub readings: Readings,
    pub line: ProcessLine,
}

impl ScadaSnapshot {
    /// Trend KPI next to the chart (ayran acidity only).
    pub fn trend_kpi(&self) -> Option<String> {
        match self.kind {
            ProductKind::Ayran => Some(format!("Acidity {:.0} °T", self.readings.acidity)),
            ProductKind::Irimshik => None,
        }
    }
}

/// Snapshot of the selection at time `t`, using the nearest measurement row.
pub fn snapshot(selection: &Selection<'_>, t: f64) -> ScadaSnapshot {
    let record = selection.nearest_record(t);
    let readings = Readings::from_record(record);
    ScadaSnapshot {
        product: selection.product.clone(),
        kind: selection.kind,
        time_hours: t,
        batch_number: batch_number(t),
        experiment: record
            .and_then(|r| r.experiment.clone())
            .unwrap_or_else(|| "Standard".to_string()),
        stage: record
            .and_then(|r| r.stage.clone())
            .unwrap_or_else(|| "Production".to_string()),
        readings,
        line: build_line(selection.kind, t, &readings),
    }
}

/// Plain-text rendering of the line for the CLI.
pub fn render_text(snap: &ScadaSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Line: {} | t = {:.1} h | batch #{} | type: {} | stage: {}\n\n",
        snap.product, snap.time_hours, snap.batch_number, snap.experiment, snap.stage
    ));

    for (i, unit) in snap.line.units.iter().enumerate() {
        let marker = if unit.active { "*" } else { " " };
        out.push_str(&format!("{marker} [{:<4}] {}\n", unit.status.label(), unit.title));
        for tag in &unit.tags {
            let value = tag.value.to_string();
            if tag.unit.is_empty() {
                out.push_str(&format!("      {:<16} {value}\n", tag.name));
            } else {
                out.push_str(&format!("      {:<16} {value} {}\n", tag.name, tag.unit));
            }
        }
        if let Some(&flow) = snap.line.pipes.get(i) {
            out.push_str(if flow { "        ║ flow\n" } else { "        │\n" });
        }
    }

    if let Some(kpi) = snap.trend_kpi() {
        out.push_str(&format!("\nTrend KPI: {kpi}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Readings {
        Readings::from_record(None)
    }

    #[test]
    fn readings_default_when_row_missing() {
        let r = defaults();
        assert_eq!(r.temperature, 20.0);
        assert_eq!(r.ph, 6.6);
        assert_eq!(r.moisture, 88.0);
        assert!((r.acidity - 16.0).abs() < 1e-9);
    }

    #[test]
    fn ayran_gap_has_no_active_unit() {
        let line = build_line(ProductKind::Ayran, 1.7, &defaults());
        assert!(line.active_unit().is_none());
        assert!(line.pipes.iter().all(|p| !p));
        assert_eq!(stage_at(ProductKind::Ayran, 1.7), None);
    }

    #[test]
    fn ayran_bottling_lights_last_pipe() {
        let line = build_line(ProductKind::Ayran, 9.0, &defaults());
        assert_eq!(line.active_unit().map(|u| u.title), Some("Bottling line"));
        assert_eq!(line.pipes, vec![false, false, false, true]);
    }

    #[test]
    fn homogenizer_uses_standard_pressure_without_reading() {
        let line = build_line(ProductKind::Ayran, 0.7, &defaults());
        let homogenizer = &line.units[1];
        assert!(homogenizer.active);
        assert_eq!(homogenizer.tags[0].value, TagValue::Number(12.5));
    }

    #[test]
    fn irimshik_cooking_heats_kettle() {
        let line = build_line(ProductKind::Irimshik, 3.0, &defaults());
        let kettle = &line.units[1];
        assert_eq!(kettle.status, UnitStatus::Heat);
        assert!(kettle.active);
        assert_eq!(line.pipes, vec![false, true, false]);
    }

    #[test]
    fn tag_format_switches_at_100() {
        assert_eq!(TagValue::Number(4.567).to_string(), "4.57");
        assert_eq!(TagValue::Number(5000.0).to_string(), "5000.0");
        assert_eq!(TagValue::Text("ON").to_string(), "ON");
    }

    #[test]
    fn batch_number_truncates() {
        assert_eq!(batch_number(0.0), 1000);
        assert_eq!(batch_number(2.567), 1256);
    }
}
