//! Additive-dose experiments: published 2D regression curves and 3D response
//! surfaces (dose × time).
//!
//! The curves are fixed laboratory results, not fits of the loaded dataset.

use clap::ValueEnum;
use nalgebra::DMatrix;

use crate::domain::ProductKind;

/// Closed-form shape of an experiment curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveShape {
    /// `intercept + slope · ln(t)`
    LogTime { intercept: f64, slope: f64 },
    /// `equilibrium + amplitude · exp(-rate · t)`
    ExpDecay { equilibrium: f64, amplitude: f64, rate: f64 },
}

impl CurveShape {
    pub fn eval(self, t: f64) -> f64 {
        match self {
            CurveShape::LogTime { intercept, slope } => intercept + slope * t.ln(),
            CurveShape::ExpDecay {
                equilibrium,
                amplitude,
                rate,
            } => equilibrium + amplitude * (-rate * t).exp(),
        }
    }

    /// Time at which the curve equals `target`, if it ever does.
    pub fn solve(self, target: f64) -> Option<f64> {
        let t = match self {
            CurveShape::LogTime { intercept, slope } => {
                if slope == 0.0 {
                    return None;
                }
                ((target - intercept) / slope).exp()
            }
            CurveShape::ExpDecay {
                equilibrium,
                amplitude,
                rate,
            } => {
                let ratio = (target - equilibrium) / amplitude;
                if !(ratio > 0.0) || rate == 0.0 {
                    return None;
                }
                -ratio.ln() / rate
            }
        };
        t.is_finite().then_some(t)
    }

    pub fn formula(self, label: &str) -> String {
        match self {
            CurveShape::LogTime { intercept, slope } => {
                format!("{label} = {intercept:.3} - {:.3} · ln(t)", -slope)
            }
            CurveShape::ExpDecay {
                equilibrium,
                amplitude,
                rate,
            } => format!("{label} = {equilibrium:.0} + {amplitude:.0} · exp(-{rate:.2} · t)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperimentCurve {
    pub label: &'static str,
    pub shape: CurveShape,
    /// Reported R² of the published regression, when known.
    pub r2: Option<f64>,
}

/// The experiment comparison of one product line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSet {
    pub product: ProductKind,
    pub title: &'static str,
    pub value_label: &'static str,
    /// Time window the curves are valid on (hours).
    pub window: (f64, f64),
    /// Readiness / target line.
    pub target: f64,
    pub curves: &'static [ExperimentCurve],
    /// Forecast table checkpoints (hours).
    pub checkpoints: &'static [f64],
}

static AYRAN_EXPERIMENTS: ExperimentSet = ExperimentSet {
    product: ProductKind::Ayran,
    title: "Souring dynamics: control vs additives",
    value_label: "pH",
    window: (2.0, 10.0),
    target: 4.6,
    curves: &[
        ExperimentCurve {
            label: "Control",
            shape: CurveShape::LogTime {
                intercept: 4.605,
                slope: -0.125,
            },
            r2: None,
        },
        ExperimentCurve {
            label: "Exp. 1 (additive 1, up to 3%)",
            shape: CurveShape::LogTime {
                intercept: 4.535,
                slope: -0.102,
            },
            r2: Some(0.973),
        },
        ExperimentCurve {
            label: "Exp. 2 (additive 2, up to 4%)",
            shape: CurveShape::LogTime {
                intercept: 4.506,
                slope: -0.125,
            },
            r2: Some(0.997),
        },
    ],
    checkpoints: &[2.0, 4.0, 6.0, 8.0, 10.0],
};

static IRIMSHIK_EXPERIMENTS: ExperimentSet = ExperimentSet {
    product: ProductKind::Irimshik,
    title: "Drying curves (cooking down)",
    value_label: "Moisture %",
    window: (0.0, 5.0),
    target: 18.0,
    curves: &[
        ExperimentCurve {
            label: "Control (0%)",
            shape: CurveShape::ExpDecay {
                equilibrium: 20.0,
                amplitude: 55.0,
                rate: 0.3,
            },
            r2: None,
        },
        ExperimentCurve {
            label: "Exp. 1 (4%)",
            shape: CurveShape::ExpDecay {
                equilibrium: 18.0,
                amplitude: 52.0,
                rate: 0.46,
            },
            r2: None,
        },
        ExperimentCurve {
            label: "Exp. 2 (5%)",
            shape: CurveShape::ExpDecay {
                equilibrium: 18.0,
                amplitude: 52.0,
                rate: 0.5,
            },
            r2: None,
        },
    ],
    checkpoints: &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
};

pub fn experiment_set(product: ProductKind) -> &'static ExperimentSet {
    match product {
        ProductKind::Ayran => &AYRAN_EXPERIMENTS,
        ProductKind::Irimshik => &IRIMSHIK_EXPERIMENTS,
    }
}

impl ExperimentSet {
    /// Forecast table: one row per checkpoint, values rounded to 3 decimals.
    pub fn comparison_table(&self) -> Vec<(f64, Vec<f64>)> {
        self.checkpoints
            .iter()
            .map(|&t| {
                let row = self
                    .curves
                    .iter()
                    .map(|c| (c.shape.eval(t) * 1000.0).round() / 1000.0)
                    .collect();
                (t, row)
            })
            .collect()
    }

    /// Time each curve reaches `target`, only when inside the valid window.
    pub fn time_to_target(&self, target: f64) -> Vec<Option<f64>> {
        let (lo, hi) = self.window;
        self.curves
            .iter()
            .map(|c| c.shape.solve(target).filter(|t| (lo..=hi).contains(t)))
            .collect()
    }

    /// `n` evenly spaced points of each curve over the window.
    pub fn sampled_curves(&self, n: usize) -> Vec<Vec<(f64, f64)>> {
        let times = linspace(self.window.0, self.window.1, n);
        self.curves
            .iter()
            .map(|c| times.iter().map(|&t| (t, c.shape.eval(t))).collect())
            .collect()
    }
}

/// Grid resolution of the response surfaces (per axis).
pub const SURFACE_GRID: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SurfaceKind {
    /// Ayran exp. 1 (dry additive, dose 1-3 %).
    AyranExp1,
    /// Ayran exp. 2 (syrup additive, dose 1-4 %).
    AyranExp2,
    /// Irimshik, dose up to 4 %.
    IrimshikDose4,
    /// Irimshik, dose up to 5 %.
    IrimshikDose5,
}

impl SurfaceKind {
    pub fn for_product(product: ProductKind) -> [SurfaceKind; 2] {
        match product {
            ProductKind::Ayran => [SurfaceKind::AyranExp1, SurfaceKind::AyranExp2],
            ProductKind::Irimshik => [SurfaceKind::IrimshikDose4, SurfaceKind::IrimshikDose5],
        }
    }

    pub fn spec(self) -> SurfaceSpec {
        match self {
            SurfaceKind::AyranExp1 => SurfaceSpec {
                title: "Ayran exp. 1: stabilization",
                value_label: "pH",
                dose: (1.0, 3.0),
                time: (2.0, 10.0),
                formula: |d, t| 4.8 - 0.12 * t.ln() - 0.02 * d + 0.01 * t * d / 10.0,
            },
            SurfaceKind::AyranExp2 => SurfaceSpec {
                title: "Ayran exp. 2: acceleration",
                value_label: "pH",
                dose: (1.0, 4.0),
                time: (2.0, 10.0),
                formula: |d, t| 4.8 - 0.13 * t.ln() - 0.05 * d,
            },
            SurfaceKind::IrimshikDose4 => SurfaceSpec {
                title: "Irimshik exp. 1: moderate cooking (dose up to 4%)",
                value_label: "Moisture %",
                dose: (0.0, 4.0),
                time: (0.0, 5.0),
                formula: irimshik_moisture,
            },
            SurfaceKind::IrimshikDose5 => SurfaceSpec {
                title: "Irimshik exp. 2: intensive cooking (dose up to 5%)",
                value_label: "Moisture %",
                dose: (0.0, 5.0),
                time: (0.0, 5.0),
                formula: irimshik_moisture,
            },
        }
    }
}

fn irimshik_moisture(dose: f64, t: f64) -> f64 {
    let start = 75.0 - dose;
    let rate = 0.3 + 0.04 * dose;
    18.0 + (start - 18.0) * (-rate * t).exp()
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceSpec {
    pub title: &'static str,
    pub value_label: &'static str,
    pub dose: (f64, f64),
    pub time: (f64, f64),
    /// `value = formula(dose, time)`
    pub formula: fn(f64, f64) -> f64,
}

/// A grid point of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub dose: f64,
    pub time: f64,
    pub value: f64,
}

/// Evaluated surface. Rows are doses, columns are times.
#[derive(Debug, Clone)]
pub struct ResponseSurface {
    pub spec: SurfaceSpec,
    pub doses: Vec<f64>,
    pub times: Vec<f64>,
    pub values: DMatrix<f64>,
}

pub fn evaluate_surface(kind: SurfaceKind, n: usize) -> ResponseSurface {
    let spec = kind.spec();
    let n = n.max(2);
    let doses = linspace(spec.dose.0, spec.dose.1, n);
    let times = linspace(spec.time.0, spec.time.1, n);
    let values = DMatrix::from_fn(n, n, |i, j| (spec.formula)(doses[i], times[j]));
    ResponseSurface {
        spec,
        doses,
        times,
        values,
    }
}

impl ResponseSurface {
    fn point(&self, i: usize, j: usize) -> SurfacePoint {
        SurfacePoint {
            dose: self.doses[i],
            time: self.times[j],
            value: self.values[(i, j)],
        }
    }

    fn extremum(&self, better: impl Fn(f64, f64) -> bool) -> SurfacePoint {
        let mut best = self.point(0, 0);
        for i in 0..self.values.nrows() {
            for j in 0..self.values.ncols() {
                let v = self.values[(i, j)];
                if better(v, best.value) {
                    best = self.point(i, j);
                }
            }
        }
        best
    }

    pub fn min(&self) -> SurfacePoint {
        self.extremum(|v, best| v < best)
    }

    pub fn max(&self) -> SurfacePoint {
        self.extremum(|v, best| v > best)
    }

    /// Shaded text heat map, highest dose on top, time left to right.
    pub fn heat_map(&self) -> String {
        const SHADES: &[u8] = b" .:-=+*#%@";
        let lo = self.min().value;
        let hi = self.max().value;
        let span = if hi > lo { hi - lo } else { 1.0 };

        let mut out = String::new();
        for i in (0..self.values.nrows()).rev() {
            out.push_str(&format!("{:>5.2} |", self.doses[i]));
            for j in 0..self.values.ncols() {
                let u = ((self.values[(i, j)] - lo) / span).clamp(0.0, 1.0);
                let idx = (u * (SHADES.len() - 1) as f64).round() as usize;
                out.push(SHADES[idx] as char);
            }
            out.push('\n');
        }
        let width = self.values.ncols();
        out.push_str(&format!("      +{}\n", "-".repeat(width)));
        let left = format!("{:.1}", self.spec.time.0);
        let right = format!("{:.1} h", self.spec.time.1);
        let gap = width.saturating_sub(left.len() + right.len());
        out.push_str(&format!("       {left}{}{right}\n", " ".repeat(gap)));
        out.push_str(&format!(
            "dose % (rows) × time (columns); ' ' = {lo:.2} … '@' = {hi:.2} {}\n",
            self.spec.value_label
        ));
        out
    }
}

pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ayran_table_matches_published_values() {
        let table = experiment_set(ProductKind::Ayran).comparison_table();
        assert_eq!(table.len(), 5);
        let (t, row) = &table[0];
        assert_eq!(*t, 2.0);
        assert_eq!(row[0], 4.518);
        assert_eq!(row[1], 4.464);
        assert_eq!(row[2], 4.419);
    }

    #[test]
    fn irimshik_curves_start_near_75_and_70() {
        let set = experiment_set(ProductKind::Irimshik);
        assert_eq!(set.curves[0].shape.eval(0.0), 75.0);
        assert_eq!(set.curves[1].shape.eval(0.0), 70.0);
    }

    #[test]
    fn time_to_target_respects_window() {
        let ayran = experiment_set(ProductKind::Ayran);
        // Every ayran curve is already below 4.6 at t = 2.
        assert!(ayran.time_to_target(4.6).iter().all(Option::is_none));
        let hits = ayran.time_to_target(4.4);
        let control = hits[0].unwrap();
        assert!((control - (0.205_f64 / 0.125).exp()).abs() < 1e-9);

        let irimshik = experiment_set(ProductKind::Irimshik);
        // The asymptote of the control curve is 20 %, so 18 % is never reached.
        assert_eq!(irimshik.time_to_target(18.0), vec![None, None, None]);
        let at_30 = irimshik.time_to_target(30.0);
        assert!(at_30[2].is_some());
    }

    #[test]
    fn surfaces_have_expected_extrema() {
        let s = evaluate_surface(SurfaceKind::IrimshikDose5, SURFACE_GRID);
        assert_eq!(s.values.shape(), (40, 40));
        let max = s.max();
        assert_eq!((max.dose, max.time, max.value), (0.0, 0.0, 75.0));
        let min = s.min();
        assert_eq!(min.dose, 5.0);
        assert_eq!(min.time, 5.0);

        let ph = evaluate_surface(SurfaceKind::AyranExp2, SURFACE_GRID);
        assert!((ph.max().value - (4.8 - 0.13 * 2.0_f64.ln() - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn heat_map_has_one_row_per_dose() {
        let s = evaluate_surface(SurfaceKind::AyranExp1, 10);
        let map = s.heat_map();
        assert_eq!(map.lines().count(), 10 + 3);
        assert!(map.contains('@'));
    }

    #[test]
    fn linspace_endpoints() {
        assert_eq!(linspace(2.0, 10.0, 5), vec![2.0, 4.0, 6.0, 8.0, 10.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
