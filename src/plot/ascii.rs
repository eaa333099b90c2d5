//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - fitted / theoretical curve: `-` line
//! - optional target line: `.`

use crate::domain::{ModelFile, Sample};

/// Everything drawn on one trend plot.
#[derive(Debug, Clone, Default)]
pub struct TrendPlot<'a> {
    pub samples: &'a [Sample],
    pub curve: &'a [(f64, f64)],
    pub target: Option<f64>,
    pub value_label: &'a str,
}

/// Render a trend plot. The time axis spans the curve and the samples.
pub fn render_ascii_plot(plot: &TrendPlot<'_>, width: usize, height: usize) -> String {
    let (t_min, t_max) = time_range(plot.samples, plot.curve).unwrap_or((0.0, 12.0));
    render_plot(plot, t_min, t_max, width, height)
}

/// Render a saved model file (curve only).
pub fn render_ascii_plot_from_model_file(model: &ModelFile, width: usize, height: usize) -> String {
    let curve: Vec<(f64, f64)> = model
        .grid
        .time_hours
        .iter()
        .zip(model.grid.value.iter())
        .map(|(&t, &y)| (t, y))
        .collect();
    let plot = TrendPlot {
        samples: &[],
        curve: &curve,
        target: None,
        value_label: &model.target_label,
    };
    render_ascii_plot(&plot, width, height)
}

fn render_plot(plot: &TrendPlot<'_>, t_min: f64, t_max: f64, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(plot).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Target first, then the curve, then points on top.
    if let Some(target) = plot.target {
        let y = map_y(target, y_min, y_max, height);
        for cell in grid[y].iter_mut() {
            *cell = '.';
        }
    }
    draw_curve(&mut grid, plot.curve, t_min, t_max, y_min, y_max);

    for s in plot.samples.iter().filter(|s| s.is_valid()) {
        let x = map_x(s.elapsed, t_min, t_max, width);
        let y = map_y(s.value, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.2}, {t_max:.2}] h | {}=[{y_min:.2}, {y_max:.2}]\n",
        if plot.value_label.is_empty() { "y" } else { plot.value_label }
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn time_range(samples: &[Sample], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for t in samples.iter().map(|s| s.elapsed).chain(curve.iter().map(|&(t, _)| t)) {
        if t.is_finite() {
            min_t = min_t.min(t);
            max_t = max_t.max(t);
        }
    }
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        Some((min_t, max_t))
    } else {
        None
    }
}

fn y_range(plot: &TrendPlot<'_>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let ys = plot
        .samples
        .iter()
        .map(|s| s.value)
        .chain(plot.curve.iter().map(|&(_, y)| y))
        .chain(plot.target);
    for y in ys.filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve.iter().filter(|(t, y)| t.is_finite() && y.is_finite()) {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank or target cells are overwritten.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let samples = [Sample::new(0.0, 4.0), Sample::new(10.0, 5.0)];
        let curve = [(0.0, 4.0), (10.0, 4.0)];
        let plot = TrendPlot {
            samples: &samples,
            curve: &curve,
            target: None,
            value_label: "pH",
        };

        let txt = render_ascii_plot(&plot, 10, 5);
        let expected = concat!(
            "Plot: t=[0.00, 10.00] h | pH=[3.95, 5.05]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn target_line_is_drawn_under_curve() {
        let curve = [(0.0, 6.0), (10.0, 4.0)];
        let plot = TrendPlot {
            samples: &[],
            curve: &curve,
            target: Some(5.0),
            value_label: "pH",
        };
        let txt = render_ascii_plot(&plot, 11, 5);
        let middle = txt.lines().nth(3).unwrap();
        assert!(middle.contains('.'));
        assert!(middle.contains('-'));
    }
}
