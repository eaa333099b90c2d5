//! Plotters-powered quality trend widget for Ratatui.
//!
//! Rendering goes through `plotters-ratatui-backend`, so the chart is drawn
//! straight into the Ratatui buffer:
//! - fitted (or theoretical) curve as a line
//! - measured samples as dots
//! - optional horizontal goal line

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only chart description. All series and bounds are computed by the
/// caller; `render()` only draws.
pub struct TrendChart<'a> {
    pub curve: &'a [(f64, f64)],
    pub samples: &'a [(f64, f64)],
    /// Horizontal reference line (goal / optimizer target).
    pub target: Option<f64>,
    /// Current prediction time, drawn as a single highlighted dot.
    pub marker: Option<(f64, f64)>,
    /// X bounds (hours).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: String,
    pub accent: (u8, u8, u8),
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let (r, g, b) = self.accent;
            let curve_color = RGBColor(r, g, b);
            let target_color = RGBColor(255, 68, 68);
            let marker_color = RGBColor(255, 255, 0);

            if let Some(target) = self.target.filter(|v| (y0..=y1).contains(v)) {
                chart.draw_series(LineSeries::new([(x0, target), (x1, target)], &target_color))?;
            }

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // Pixels rather than Circle: the backend scales circle radii wrongly.
            chart.draw_series(self.samples.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            if let Some(point) = self.marker {
                chart.draw_series(std::iter::once(Pixel::new(point, marker_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
