//! Ratatui-based terminal UI.
//!
//! The dashboard shows the current AQI for a city (colored by category), the
//! per-pollutant breakdown, and the AQI trend over a configurable number of
//! days. Fetches run inline; failures land in the status line and the last
//! good report stays on screen.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::aqi::{Category, CategoryColor, bands_for};
use crate::app::pipeline::{CityReport, run_report_with};
use crate::data::{OwmClient, PollutionSource};
use crate::domain::{DashboardConfig, Pollutant};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{AqiPlottersChart, trend_series};

/// Longest history window the dashboard offers.
pub const MAX_DAYS: u32 = 30;
const EXPORT_DIR: &str = "exports";

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Fail on a missing key before touching the terminal.
    let client = OwmClient::from_env()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(client, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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

struct App<S> {
    source: S,
    config: DashboardConfig,
    city_input: String,
    editing_city: bool,
    show_help: bool,
    /// Set by key handlers; the fetch runs after the next redraw so the
    /// "Fetching..." status is visible.
    refresh_pending: bool,
    status: String,
    report: Option<CityReport>,
}

impl<S: PollutionSource> App<S> {
    fn new(source: S, config: DashboardConfig) -> Self {
        let status = fetching_status(&config);
        Self {
            source,
            config,
            city_input: String::new(),
            editing_city: false,
            show_help: false,
            refresh_pending: true,
            status,
            report: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if self.refresh_pending {
                self.refresh();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            // Any key closes the overlay.
            self.show_help = false;
            return false;
        }
        if self.editing_city {
            self.handle_city_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Enter | KeyCode::Char('c') => {
                self.editing_city = true;
                self.city_input = self.config.city.clone();
                self.status = "Editing city. Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Left => self.adjust_days(-1),
            KeyCode::Right => self.adjust_days(1),
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Char('e') => self.export_snapshot(Path::new(EXPORT_DIR)),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        false
    }

    fn handle_city_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_city = false;
                self.status = "City edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_city = false;
                let city = self.city_input.trim();
                if city.is_empty() {
                    self.status = "City name cannot be empty.".to_string();
                } else {
                    self.config.city = city.to_string();
                    self.request_refresh();
                }
            }
            KeyCode::Backspace => {
                self.city_input.pop();
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    self.city_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_days(&mut self, delta: i32) {
        let next = self.config.history_days.saturating_add_signed(delta).clamp(1, MAX_DAYS);
        if next == self.config.history_days {
            self.status = format!("days: {next} (range 1-{MAX_DAYS})");
            return;
        }
        self.config.history_days = next;
        self.request_refresh();
    }

    fn request_refresh(&mut self) {
        self.refresh_pending = true;
        self.status = fetching_status(&self.config);
    }

    fn refresh(&mut self) {
        self.refresh_pending = false;
        match run_report_with(
            &self.source,
            &self.config.city,
            self.config.history_days,
            Utc::now(),
        ) {
            Ok(report) => {
                self.status = format!(
                    "Updated {} ({} trend points).",
                    report.fetched_at.format("%H:%M:%S UTC"),
                    report.trend.len()
                );
                self.report = Some(report);
            }
            Err(err) => {
                tracing::warn!(city = %self.config.city, error = %err, "refresh failed");
                self.status = format!("Fetch failed: {err}");
            }
        }
    }

    fn export_snapshot(&mut self, dir: &Path) {
        let Some(report) = &self.report else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        self.status = match crate::io::write_snapshot(dir, report) {
            Ok(path) => format!("Wrote snapshot: {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            draw_help(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("aqi", Style::default().fg(Color::Cyan)),
            Span::raw(" | Air Quality Index (OpenWeatherMap)"),
        ]));

        let resolved = self
            .report
            .as_ref()
            .map(|r| {
                format!(
                    "{} ({:.2}, {:.2}) | fetched {}",
                    r.location.label(),
                    r.location.lat,
                    r.location.lon,
                    r.fetched_at.format("%Y-%m-%d %H:%M UTC")
                )
            })
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "city: {} → {resolved} | days: {}",
                self.config.city, self.config.history_days
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[0]);

        self.draw_current(frame, top[0]);
        self.draw_pollutants(frame, top[1]);
        self.draw_chart(frame, chunks[1]);
        self.draw_settings(frame, chunks[2]);
    }

    fn draw_current(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Current AQI").borders(Borders::ALL);

        let Some(report) = &self.report else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let current = &report.current;
        let mut lines: Vec<Line> = Vec::new();
        match (current.aqi, current.category()) {
            (Some(aqi), Some(category)) => {
                let style = Style::default()
                    .fg(ui_color(category.color()))
                    .add_modifier(Modifier::BOLD);
                lines.push(Line::from(vec![
                    Span::styled(format!("AQI {aqi}"), style),
                    Span::raw("  "),
                    Span::styled(category.label(), style),
                ]));
                lines.push(Line::from(category.recommendation()));
            }
            _ => {
                lines.push(Line::from(Span::styled(
                    "AQI undefined",
                    Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(
                    "No reported pollutant falls within the breakpoint tables.",
                ));
            }
        }
        lines.push(Line::from(Span::styled(
            format!(
                "dominant: {} | provider index: {}/5 (informational)",
                current.dominant.map(|p| p.display_name()).unwrap_or("-"),
                current.provider_index
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(p, area);
    }

    fn draw_pollutants(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Pollutants").borders(Borders::ALL);
        let Some(report) = &self.report else {
            frame.render_widget(block, area);
            return;
        };

        let rows: Vec<Row> = report
            .current
            .sub_indices
            .iter()
            .map(|s| {
                let conc = s
                    .concentration
                    .map(|c| format!("{c:.2} {}", s.pollutant.table_unit()))
                    .unwrap_or_else(|| "n/a".to_string());
                let aqi = match (s.concentration, s.aqi) {
                    (_, Some(aqi)) => Cell::from(aqi.to_string())
                        .style(Style::default().fg(ui_color(Category::from_aqi(aqi).color()))),
                    (Some(_), None) => Cell::from("outside table")
                        .style(Style::default().fg(Color::Gray)),
                    (None, None) => Cell::from("-"),
                };
                Row::new(vec![Cell::from(s.pollutant.display_name()), Cell::from(conc), aqi])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Min(5),
            ],
        )
        .header(
            Row::new(vec!["Pollutant", "Concentration", "AQI"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!(
            "AQI trend (last {} day(s), x = days)",
            self.config.history_days
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(report) = &self.report else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let points: Vec<(i64, Option<i32>)> = report
            .trend
            .iter()
            .map(|a| (a.timestamp.timestamp(), a.aqi))
            .collect();
        let series = trend_series(
            &points,
            report.fetched_at.timestamp(),
            report.history_days,
        );

        if series.points.is_empty() {
            let msg = Paragraph::new("No defined AQI points in this window.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let widget = AqiPlottersChart {
            segments: &series.segments,
            points: &series.points,
            thresholds: &series.thresholds,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let city = if self.editing_city {
            Line::from(vec![
                Span::raw("City: "),
                Span::styled(
                    format!("{}_", self.city_input),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            Line::from(format!("City: {}", self.config.city))
        };
        let days = Line::from(format!("Days: {} (←/→)", self.config.history_days));

        let p = Paragraph::new(Text::from(vec![city, days]))
            .block(Block::default().title("Settings").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Enter/c city  ←/→ days  r refresh  e export  ? help  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fetching_status(config: &DashboardConfig) -> String {
    format!(
        "Fetching air quality for {} ({} day(s))...",
        config.city, config.history_days
    )
}

fn ui_color(color: CategoryColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled("What is AQI?", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("A scale for how polluted the air currently is."),
        Line::from(""),
        Line::from(Span::styled(
            "How is it calculated?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(
            "Each pollutant's concentration is mapped onto an index band; the headline AQI \
             is the highest of those sub-indices.",
        ),
        Line::from(format!(
            "Pollutants: {}.",
            Pollutant::ALL
                .iter()
                .filter(|&&p| !bands_for(p).is_empty())
                .map(|p| p.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        )),
        Line::from(""),
        Line::from(Span::styled(
            "What do the colors mean?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let ranges = ["0-50", "51-100", "101+"];
    for (category, range) in Category::ALL.into_iter().zip(ranges) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{range:>7} {:<10}", category.label()),
                Style::default().fg(ui_color(category.color())),
            ),
            Span::raw(category.recommendation()),
        ]));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "How often is the data updated?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Each refresh (r) fetches the latest observation from OpenWeatherMap."),
        Line::from("The provider's own 1-5 index is shown for reference only."),
        Line::from(""),
        Line::from(Span::styled("Press any key to close.", Style::default().fg(Color::Gray))),
    ]);
    lines
}

fn draw_help(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let rect = centered(area, 80, 70);
    frame.render_widget(Clear, rect);
    let p = Paragraph::new(Text::from(help_lines()))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("About AQI").borders(Borders::ALL));
    frame.render_widget(p, rect);
}

/// A rectangle covering `pct_x`% by `pct_y`% of `area`, centered.
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(pct_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(pct_y) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::fake::FakeSource;

    fn app() -> App<FakeSource> {
        let config = DashboardConfig {
            city: "Oslo".to_string(),
            history_days: 7,
            ..DashboardConfig::default()
        };
        App::new(FakeSource::new(), config)
    }

    #[test]
    fn first_refresh_loads_a_report() {
        let mut app = app();
        assert!(app.refresh_pending);
        assert!(app.status.starts_with("Fetching air quality for Oslo"));

        app.refresh();
        assert!(!app.refresh_pending);
        let report = app.report.as_ref().unwrap();
        assert_eq!(report.current.aqi, Some(88));
        assert!(app.status.starts_with("Updated "));
    }

    #[test]
    fn fetch_errors_stay_in_the_status_line() {
        let mut app = app();
        app.refresh();
        app.source.location = None;

        app.handle_key(KeyCode::Char('r'));
        app.refresh();
        assert_eq!(app.status, "Fetch failed: City 'Oslo' not found");
        // Last good report is kept.
        assert!(app.report.is_some());
    }

    #[test]
    fn city_edit_applies_on_enter_and_cancels_on_esc() {
        let mut app = app();
        app.refresh_pending = false;

        app.handle_key(KeyCode::Char('c'));
        assert!(app.editing_city);
        // `q` is text while editing, not quit.
        assert!(!app.handle_key(KeyCode::Char('q')));
        assert_eq!(app.city_input, "Osloq");
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.config.city, "Oslo");
        assert!(!app.refresh_pending);

        app.handle_key(KeyCode::Enter);
        for _ in 0..4 {
            app.handle_key(KeyCode::Backspace);
        }
        for c in "Lima".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.config.city, "Lima");
        assert!(app.refresh_pending);
    }

    #[test]
    fn days_are_clamped() {
        let mut app = app();
        app.config.history_days = 1;
        app.refresh_pending = false;

        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.history_days, 1);
        assert!(!app.refresh_pending);

        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.history_days, 2);
        assert!(app.refresh_pending);

        app.config.history_days = MAX_DAYS;
        app.refresh_pending = false;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.history_days, MAX_DAYS);
        assert!(!app.refresh_pending);
    }

    #[test]
    fn help_overlay_swallows_one_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('?'));
        assert!(app.show_help);
        assert!(!app.handle_key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn export_needs_a_report() {
        let mut app = app();
        let dir = std::env::temp_dir().join(format!("airvision_tui_{}", std::process::id()));

        app.export_snapshot(&dir);
        assert_eq!(app.status, "Nothing to export yet.");

        app.refresh();
        app.export_snapshot(&dir);
        assert!(app.status.starts_with("Wrote snapshot: "), "{}", app.status);
    }

    #[test]
    fn help_covers_every_category() {
        let text: String = help_lines()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        for category in Category::ALL {
            assert!(text.contains(category.label()));
        }
        assert!(text.contains("Pollutants: PM2.5, PM10, O3, CO."));
    }

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 80, 70), Rect::new(10, 6, 80, 28));
    }
}
