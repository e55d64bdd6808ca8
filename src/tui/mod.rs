//! Ratatui-based terminal UI.
//!
//! Each render pass is recorded into a [`Sheet`] and laid out as: header with
//! banners, closing-price chart, metrics row, raw-data table and a footer.
//! The lookback window can be changed with the arrow keys; each window is its
//! own cache entry, so switching back is instant.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Terminal,
};

use crate::app::pipeline::Dashboard;
use crate::domain::{DashboardConfig, LookbackDays, PriceRow};
use crate::error::AppError;
use crate::present::{Delta, Sheet, Trend};

mod plotters_chart;

use plotters_chart::PricePlottersChart;

/// Start the TUI.
pub fn run(dashboard: Dashboard, config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard, config);
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

struct App {
    dashboard: Dashboard,
    config: DashboardConfig,
    lookback: LookbackDays,
    sheet: Sheet,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard, config: DashboardConfig) -> Self {
        let lookback = config.lookback;
        let mut app = Self {
            dashboard,
            config,
            lookback,
            sheet: Sheet::default(),
            status: String::new(),
        };
        app.reload();
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
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
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                self.lookback = self.lookback.prev_preset();
                self.reload();
            }
            KeyCode::Right => {
                self.lookback = self.lookback.next_preset();
                self.reload();
            }
            KeyCode::Char('r') => {
                self.reload();
            }
            KeyCode::Char('f') => {
                self.dashboard.invalidate(self.lookback);
                self.reload();
                if self.sheet.errors().next().is_none() {
                    self.status = format!("Refetched {} of data.", self.lookback);
                }
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    /// One render pass: load through the cache and record the presenter calls.
    fn reload(&mut self) {
        let view = self.dashboard.load(self.lookback, crate::app::today());
        self.status = match &view.fetch_error {
            Some(_) => "Fetch failed; press f to retry.".to_string(),
            None => format!("{} rows | window {}", view.series.len(), self.lookback),
        };
        self.sheet = Sheet::from_view(&view);
    }

    fn export(&mut self) {
        let Some(Ok(series)) = self
            .dashboard
            .cache()
            .get(&(self.dashboard.symbol().clone(), self.lookback))
        else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        if series.is_empty() {
            self.status = "Nothing to export.".to_string();
            return;
        }

        let path = PathBuf::from(format!(
            "{}_{}d.csv",
            self.config.symbol.as_str().to_ascii_lowercase(),
            self.lookback.get()
        ));
        self.status = match crate::io::write_series_csv(&path, &series) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let banners = self.sheet.errors().count() + self.sheet.warnings().count();
        let header_height = 4 + banners as u16;

        let has_chart = self.sheet.chart().is_some();
        let has_metrics = self.sheet.metrics().next().is_some();
        let table_rows = self.sheet.table_block().map(|(_, rows)| rows.len()).unwrap_or(0);

        let mut constraints = vec![Constraint::Length(header_height)];
        if has_chart {
            constraints.push(Constraint::Min(8));
        }
        if has_metrics {
            constraints.push(Constraint::Length(4));
        }
        if table_rows > 0 {
            constraints.push(Constraint::Length(table_rows as u16 + 4));
        }
        if !has_chart {
            constraints.push(Constraint::Min(0));
        }
        constraints.push(Constraint::Length(3));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        let mut idx = 0;
        self.draw_header(frame, chunks[idx]);
        idx += 1;
        if has_chart {
            self.draw_chart(frame, chunks[idx]);
            idx += 1;
        }
        if has_metrics {
            self.draw_metrics(frame, chunks[idx]);
            idx += 1;
        }
        if table_rows > 0 {
            self.draw_table(frame, chunks[idx]);
            idx += 1;
        }
        if !has_chart {
            idx += 1;
        }
        self.draw_footer(frame, chunks[idx]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (title, caption) = self.sheet.heading().unwrap_or(("Price Tracker", ""));

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gld-dash", Style::default().fg(Color::Cyan)),
            Span::raw(" | "),
            Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(Span::styled(
            caption.to_string(),
            Style::default().fg(Color::Gray),
        )));

        for msg in self.sheet.errors() {
            lines.push(Line::from(Span::styled(
                format!("✖ {msg}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        for msg in self.sheet.warnings() {
            lines.push(Line::from(Span::styled(
                format!("⚠ {msg}"),
                Style::default().fg(Color::Yellow),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((title, points)) = self.sheet.chart() else {
            return;
        };

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((series, x_bounds, y_bounds)) = chart_series(points) else {
            let msg = Paragraph::new("No plottable closes.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PricePlottersChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: "close".to_string(),
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let metrics: Vec<_> = self.sheet.metrics().collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, metrics.len() as u32); metrics.len()])
            .split(area);

        for ((label, value, delta), col) in metrics.into_iter().zip(columns.iter()) {
            let mut spans = vec![Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(delta) = delta {
                spans.push(Span::raw("  "));
                spans.push(delta_span(delta));
            }
            let p = Paragraph::new(Line::from(spans))
                .block(Block::default().title(label.to_string()).borders(Borders::ALL));
            frame.render_widget(p, *col);
        }
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((title, rows)) = self.sheet.table_block() else {
            return;
        };

        let header = Row::new(["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        // Newest first, like a trading blotter.
        let body: Vec<Row> = rows.iter().rev().map(table_row).collect();
        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
        ];

        let table = Table::new(body, widths)
            .header(header)
            .column_spacing(1)
            .block(Block::default().title(title.to_string()).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ window  r re-render  f refetch  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn delta_span(delta: &Delta) -> Span<'static> {
    let (arrow, color) = match delta.trend {
        Trend::Up => ("▲", Color::Green),
        Trend::Down => ("▼", Color::Red),
        Trend::Flat => ("=", Color::Gray),
    };
    Span::styled(format!("{arrow} {}", delta.text), Style::default().fg(color))
}

fn table_row(r: &PriceRow) -> Row<'static> {
    let price = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        Cell::from(r.date.format("%Y-%m-%d").to_string()),
        Cell::from(price(r.open)),
        Cell::from(price(r.high)),
        Cell::from(price(r.low)),
        Cell::from(price(r.close)),
        Cell::from(price(r.adj_close)),
        Cell::from(r.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
    ])
}

/// Map `(date, close)` points to chart space (x = days since CE) and bounds.
fn chart_series(points: &[(NaiveDate, f64)]) -> Option<(Vec<(f64, f64)>, [f64; 2], [f64; 2])> {
    let series: Vec<(f64, f64)> = points
        .iter()
        .map(|&(d, y)| (f64::from(d.num_days_from_ce()), y))
        .collect();
    let (first, last) = (series.first()?, series.last()?);

    let mut x_bounds = [first.0, last.0];
    if x_bounds[1] <= x_bounds[0] {
        x_bounds = [x_bounds[0] - 1.0, x_bounds[0] + 1.0];
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &series {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some((series, x_bounds, [y_min - pad, y_max + pad]))
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.2}")
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
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
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

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(x_val);
        let label_len = label.len() as u16;
        let start = x
            .saturating_sub((label.len() / 2) as u16)
            .clamp(inner.x, (inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_price(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("close ($)")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    use crate::cache::CachePolicy;
    use crate::data::SyntheticSource;
    use crate::domain::Symbol;

    fn config(days: u32) -> DashboardConfig {
        DashboardConfig {
            symbol: Symbol::parse("GLD").unwrap(),
            lookback: LookbackDays::new(days).unwrap(),
            tail_rows: 10,
            timeout: Duration::from_secs(1),
            failure_ttl: None,
            demo: true,
            seed: 3,
            log_file: None,
        }
    }

    fn app() -> App {
        let cfg = config(365);
        let dashboard = Dashboard::new(
            Box::new(SyntheticSource::new(cfg.seed)),
            cfg.symbol.clone(),
            CachePolicy::session(),
            cfg.tail_rows,
        );
        App::new(dashboard, cfg)
    }

    #[test]
    fn chart_series_maps_dates_and_pads_bounds() {
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let (series, x, y) = chart_series(&[(d1, 100.0), (d2, 120.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(x[1] - x[0], 10.0);
        assert!((y[0] - 99.0).abs() < 1e-9);
        assert!((y[1] - 121.0).abs() < 1e-9);
        assert_eq!(fmt_axis_date(x[0]), "2025-01-01");
        assert!(chart_series(&[]).is_none());
    }

    #[test]
    fn arrow_keys_cycle_lookback_and_cache_each_window() {
        let mut app = app();
        assert_eq!(app.lookback.get(), 365);

        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.lookback.get(), 730);
        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.lookback.get(), 365);
        assert_eq!(app.dashboard.cache().len(), 2);

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn draws_full_dashboard_into_test_backend() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Price Tracker: GLD"));
        assert!(text.contains("Latest Close Price"));
        assert!(text.contains("Raw Data Table"));
    }
}
