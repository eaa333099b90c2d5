//! Ratatui-based terminal UI.
//!
//! The dashboard view has a settings panel (product, experiment, process time
//! and optimizer target), the quality trend chart and the prediction, KPI and
//! optimizer panels. `v` switches to the SCADA line view for the same selection.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::pipeline::{self, PREDICTION_RANGE, RunOutput};
use crate::bundle::{BUNDLE_DIR, write_bundle};
use crate::data::Dataset;
use crate::domain::{DashboardConfig, Severity};
use crate::error::AppError;
use crate::scada::UnitStatus;

mod plotters_chart;

use plotters_chart::TrendChart;

/// Time slider step (hours).
const TIME_STEP_H: f64 = 0.5;
const FIELD_COUNT: usize = 4;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before touching the terminal so data errors print normally.
    let dataset = pipeline::load(&config)?;
    let mut app = App::new(config, dataset);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Dashboard,
    Scada,
}

struct App {
    config: DashboardConfig,
    dataset: Dataset,
    products: Vec<String>,
    selected_field: usize,
    editing_target: bool,
    target_input: String,
    view: View,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(mut config: DashboardConfig, dataset: Dataset) -> Self {
        let products = dataset.products();
        if config.product.is_none() {
            config.product = dataset.default_product();
        }
        let target_input = config.target.map(|t| t.to_string()).unwrap_or_default();
        let mut app = Self {
            config,
            dataset,
            products,
            selected_field: 0,
            editing_target: false,
            target_input,
            view: View::Dashboard,
            status: String::new(),
            run: None,
        };
        app.recompute();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_target {
            self.handle_target_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => self.selected_field = (self.selected_field + 1).min(FIELD_COUNT - 1),
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter if self.selected_field == 3 => {
                self.editing_target = true;
                self.status = "Editing target. Enter to apply, Esc to cancel, empty = product goal.".to_string();
            }
            KeyCode::Char('v') => {
                self.view = match self.view {
                    View::Dashboard => View::Scada,
                    View::Scada => View::Dashboard,
                };
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('d') => {
                self.status = match write_bundle(&self.dataset, Path::new(BUNDLE_DIR), self.config.time_hours) {
                    Ok(path) => format!("Wrote bundle: {}", path.display()),
                    Err(err) => format!("Bundle write failed: {err}"),
                };
            }
            _ => {}
        }
        false
    }

    fn handle_target_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_target = false;
                self.target_input = self.config.target.map(|t| t.to_string()).unwrap_or_default();
                self.status = "Target edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_target = false;
                let trimmed = self.target_input.trim();
                if trimmed.is_empty() {
                    self.config.target = None;
                } else {
                    match trimmed.parse::<f64>() {
                        Ok(v) if v.is_finite() => self.config.target = Some(v),
                        _ => {
                            self.status = format!("Invalid target '{trimmed}'.");
                            return;
                        }
                    }
                }
                self.recompute();
            }
            KeyCode::Backspace => {
                self.target_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => self.target_input.push(c),
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                let current = self.config.product.as_deref();
                self.config.product = cycle(&self.products, current, delta).map(str::to_string);
                self.config.experiment = None;
            }
            1 => {
                let experiments = self.experiments();
                self.config.experiment = cycle_optional(&experiments, self.config.experiment.as_deref(), delta);
            }
            2 => self.config.time_hours = step_time(self.config.time_hours, delta),
            _ => return,
        }
        self.recompute();
    }

    fn experiments(&self) -> Vec<String> {
        self.config
            .product
            .as_deref()
            .map(|p| self.dataset.experiment_types(p))
            .unwrap_or_default()
    }

    fn reload(&mut self) {
        match pipeline::load(&self.config) {
            Ok(dataset) => {
                self.products = dataset.products();
                self.dataset = dataset;
                if self.config.product.as_ref().is_none_or(|p| !self.products.contains(p)) {
                    self.config.product = self.dataset.default_product();
                    self.config.experiment = None;
                }
                self.recompute();
                if self.run.is_some() {
                    self.status = format!("Reloaded {}.", self.dataset.source.display());
                }
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn recompute(&mut self) {
        match pipeline::run_dashboard(&self.dataset, &self.config) {
            Ok(run) => {
                self.status = match &run.optimization {
                    Ok(_) => format!("{} rows selected.", run.n_points),
                    Err(err) => err.to_string(),
                };
                self.run = Some(run);
            }
            Err(err) => {
                tracing::warn!(%err, "dashboard run failed");
                self.status = err.to_string();
                self.run = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Dashboard => self.draw_dashboard(frame, chunks[1]),
            View::Scada => self.draw_scada(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(vec![
            Span::styled("twin", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | data: {}", self.dataset.source.display())),
        ])];

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} ({}) | batch: {} | rows: {} | model: {}",
                    run.product,
                    run.kind.display_name(),
                    run.experiment.as_deref().unwrap_or(crate::report::ALL_BATCHES),
                    run.n_points,
                    run.predictor.formula(run.profile().target_label),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_dashboard(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(42)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(columns[0]);

        self.draw_chart(frame, left[0]);
        self.draw_settings(frame, left[1]);
        self.draw_side_panel(frame, columns[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Quality trend").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No selection.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(run);
        let profile = run.profile();
        let y_label = axis_label(profile.target_label, profile.target_unit);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendChart {
            curve: &series.curve,
            samples: &series.samples,
            target: series.target,
            marker: Some((run.prediction.time_hours, run.prediction.value)),
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "t (h)",
            y_label: y_label.clone(),
            accent: profile.accent,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &series, &y_label);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let target = if self.editing_target {
            format!("{}_", self.target_input)
        } else {
            self.config
                .target
                .map(|t| format!("{t:.2}"))
                .unwrap_or_else(|| "product goal".to_string())
        };

        let items = vec![
            ListItem::new(format!("Product: {}", self.config.product.as_deref().unwrap_or("-"))),
            ListItem::new(format!(
                "Experiment: {}",
                self.config.experiment.as_deref().unwrap_or(crate::report::ALL_BATCHES)
            )),
            ListItem::new(format!("Time: {:.1} h", self.config.time_hours)),
            ListItem::new(format!("Target: {target}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_side_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        let Some(run) = &self.run else {
            frame.render_widget(Block::default().title("Prediction").borders(Borders::ALL), area);
            return;
        };
        let profile = run.profile();

        let status = run.prediction.status;
        let status_color = match status.severity() {
            Severity::Ok => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Critical => Color::Red,
        };
        let mut lines = vec![
            Line::from(format!(
                "{} at {:.1} h: {:.2}{}",
                profile.target_label,
                run.prediction.time_hours,
                run.prediction.value,
                crate::report::unit_suffix(profile.target_unit)
            )),
            Line::from(vec![
                Span::raw("Status: "),
                Span::styled(
                    status.label().to_uppercase(),
                    Style::default().fg(status_color).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        if run.predictor.is_theoretical() {
            lines.push(Line::from(Span::styled(
                "Theoretical model in use",
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().title("Prediction").borders(Borders::ALL)),
            chunks[0],
        );

        let kpis: Vec<ListItem> = run
            .kpis
            .iter()
            .map(|k| ListItem::new(format!("{:<20} {}", k.title, k.formatted())))
            .collect();
        frame.render_widget(
            List::new(kpis).block(Block::default().title("KPIs").borders(Borders::ALL)),
            chunks[1],
        );

        let optimizer = match &run.optimization {
            Ok(opt) => crate::report::format_optimization(profile, opt),
            Err(err) => err.to_string(),
        };
        frame.render_widget(
            Paragraph::new(optimizer)
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Optimizer").borders(Borders::ALL)),
            chunks[2],
        );
    }

    fn draw_scada(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            frame.render_widget(Block::default().title("SCADA").borders(Borders::ALL), area);
            return;
        };
        let snap = &run.scada;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let title = format!(
            "t = {:.1} h | batch #{} | type: {} | stage: {}",
            snap.time_hours, snap.batch_number, snap.experiment, snap.stage
        );
        frame.render_widget(
            Paragraph::new(title).block(Block::default().title(snap.product.as_str()).borders(Borders::ALL)),
            chunks[0],
        );

        let n = snap.line.units.len().max(1) as u32;
        let unit_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
            .split(chunks[1]);

        for (i, (unit, rect)) in snap.line.units.iter().zip(unit_areas.iter()).enumerate() {
            let color = match unit.status {
                UnitStatus::Run => Color::Green,
                UnitStatus::Heat => Color::Red,
                UnitStatus::Off => Color::DarkGray,
            };
            let border = if unit.active {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let mut lines = vec![Line::from(Span::styled(unit.status.label(), Style::default().fg(color)))];
            for tag in &unit.tags {
                lines.push(Line::from(format!("{}: {} {}", tag.name, tag.value, tag.unit)));
            }
            if let Some(&flow) = snap.line.pipes.get(i) {
                let (text, style) = if flow {
                    ("flow →", Style::default().fg(Color::Cyan))
                } else {
                    ("idle", Style::default().fg(Color::DarkGray))
                };
                lines.push(Line::from(Span::styled(text, style)));
            }

            frame.render_widget(
                Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                    Block::default()
                        .title(unit.title)
                        .borders(Borders::ALL)
                        .border_style(border),
                ),
                *rect,
            );
        }

        let kpi = snap.trend_kpi().unwrap_or_default();
        frame.render_widget(
            Paragraph::new(kpi).block(Block::default().title("Trend KPI").borders(Borders::ALL)),
            chunks[2],
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit target  v scada  r reload  d bundle  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
    }
}

/// Next/previous entry of `items`, wrapping around.
fn cycle<'a>(items: &'a [String], current: Option<&str>, delta: i32) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }
    let n = items.len() as i64;
    let pos = current.and_then(|c| items.iter().position(|i| i == c)).unwrap_or(0) as i64;
    let next = (pos + i64::from(delta)).rem_euclid(n) as usize;
    Some(items[next].as_str())
}

/// Like [`cycle`] but with a leading "none" slot (all batches).
fn cycle_optional(items: &[String], current: Option<&str>, delta: i32) -> Option<String> {
    let n = items.len() as i64 + 1;
    let pos = current
        .and_then(|c| items.iter().position(|i| i == c))
        .map(|p| p as i64 + 1)
        .unwrap_or(0);
    let next = (pos + i64::from(delta)).rem_euclid(n);
    if next == 0 {
        None
    } else {
        items.get(next as usize - 1).cloned()
    }
}

fn step_time(t: f64, delta: i32) -> f64 {
    let next = t + f64::from(delta) * TIME_STEP_H;
    next.clamp(*PREDICTION_RANGE.start(), *PREDICTION_RANGE.end())
}

fn axis_label(label: &str, unit: &str) -> String {
    if unit.is_empty() {
        label.to_string()
    } else {
        format!("{label} ({unit})")
    }
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.1}")
}

/// Chart-ready series for one run.
#[derive(Debug, Clone)]
struct ChartSeries {
    curve: Vec<(f64, f64)>,
    samples: Vec<(f64, f64)>,
    target: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput) -> ChartSeries {
    let t1 = run
        .max_duration
        .unwrap_or(0.0)
        .max(*PREDICTION_RANGE.end());
    let x_bounds = [0.0, t1];

    let samples: Vec<(f64, f64)> = run.samples.iter().map(|s| (s.elapsed, s.value)).collect();

    let n = 200usize;
    let curve: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let t = t1 * i as f64 / (n as f64 - 1.0);
            (t, run.predictor.predict(t))
        })
        .collect();

    let target = match &run.optimization {
        Ok(opt) => Some(opt.target),
        Err(_) => Some(run.profile().goal),
    };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in samples.iter().chain(&curve) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if let Some(t) = target {
        y_min = y_min.min(t);
        y_max = y_max.max(t);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ChartSeries {
        curve,
        samples,
        target,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Tick labels drawn as plain text, since the terminal backend has no fonts.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    series: &ChartSeries,
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = series.x_bounds;
    let [y0, y1] = series.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = format!("{:.1}", x0 + u * (x1 - x0));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = format!("{:.1}", y0 + u * (y1 - y0));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let start = (inner.x + insets.left.saturating_sub(1)).saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(
            Paragraph::new("t (h)").alignment(Alignment::Center).style(style),
            x_rect,
        );
    }

    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.min(y_label.chars().count() as u16 + 1),
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(y_label.to_string()).style(style.add_modifier(Modifier::BOLD)),
        y_rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GeneratorConfig, generate_rows, write_rows};
    use crate::io::read_dataset;

    fn generated() -> Dataset {
        let rows = generate_rows(&GeneratorConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        read_dataset(buf.as_slice(), Path::new("generated.csv")).unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let items = names(&["a", "b", "c"]);
        assert_eq!(cycle(&items, Some("c"), 1), Some("a"));
        assert_eq!(cycle(&items, Some("a"), -1), Some("c"));
        assert_eq!(cycle(&items, None, 1), Some("b"));
        assert_eq!(cycle(&[], None, 1), None);
    }

    #[test]
    fn cycle_optional_passes_through_all_batches() {
        let items = names(&["x", "y"]);
        assert_eq!(cycle_optional(&items, None, 1), Some("x".to_string()));
        assert_eq!(cycle_optional(&items, Some("y"), 1), None);
        assert_eq!(cycle_optional(&items, None, -1), Some("y".to_string()));
    }

    #[test]
    fn time_steps_stay_in_prediction_range() {
        assert_eq!(step_time(5.0, 1), 5.5);
        assert_eq!(step_time(10.0, 1), 10.0);
        assert_eq!(step_time(0.0, -1), 0.0);
    }

    #[test]
    fn chart_series_covers_samples_and_target() {
        let dataset = generated();
        let run = pipeline::run_dashboard(&dataset, &DashboardConfig::default()).unwrap();
        let series = chart_series(&run);

        assert_eq!(series.samples.len(), run.samples.len());
        assert_eq!(series.curve.len(), 200);
        assert_eq!(series.x_bounds[0], 0.0);
        assert!(series.x_bounds[1] >= 10.0);

        let [y0, y1] = series.y_bounds;
        assert!(series.samples.iter().all(|&(_, y)| y >= y0 && y <= y1));
        let target = series.target.unwrap();
        assert!(target >= y0 && target <= y1);
    }

    #[test]
    fn app_switches_product_and_resets_experiment() {
        let dataset = generated();
        let mut app = App::new(DashboardConfig::default(), dataset);
        assert!(app.run.is_some());
        let first = app.config.product.clone();

        app.selected_field = 1;
        app.adjust_field(1);
        assert!(app.config.experiment.is_some());

        app.selected_field = 0;
        app.adjust_field(1);
        assert_ne!(app.config.product, first);
        assert!(app.config.experiment.is_none());
        assert!(app.run.is_some());
    }

    #[test]
    fn invalid_target_keeps_previous_value() {
        let mut app = App::new(DashboardConfig::default(), generated());
        app.selected_field = 3;
        app.handle_key(KeyCode::Enter);
        assert!(app.editing_target);
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Enter);
        assert!(!app.editing_target);
        assert_eq!(app.config.target, None);
        assert!(app.status.contains("Invalid target"));
    }

    #[test]
    fn quit_and_view_toggle_keys() {
        let mut app = App::new(DashboardConfig::default(), generated());
        assert!(!app.handle_key(KeyCode::Char('v')));
        assert_eq!(app.view, View::Scada);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
