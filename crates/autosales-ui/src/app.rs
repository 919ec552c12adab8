//! Main application state and TUI event loop for the sales dashboard.
//!
//! [`App`] owns the theme, the [`ReportSession`] and the view toggles.  Key
//! presses change the session parameters; every frame re-reads the report
//! for the current parameters, which the session serves from its cache
//! after the first build.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use autosales_data::report::Report;
use autosales_runtime::report_session::ReportSession;

use crate::chart_view;
use crate::components::header::Header;
use crate::table_view;
use crate::themes::Theme;

/// Rows scrolled by PageUp / PageDown in the raw data panel.
const RAW_PAGE: usize = 10;

// ── View ──────────────────────────────────────────────────────────────────────

/// How each report chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Charts,
    Tables,
}

impl View {
    fn toggled(self) -> Self {
        match self {
            View::Charts => View::Tables,
            View::Tables => View::Charts,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub session: ReportSession,
    pub view: View,
    /// Whether the raw record panel is shown under the charts.
    pub show_raw: bool,
    /// First record shown in the raw panel.
    pub raw_offset: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(session: ReportSession, theme_name: &str, show_raw: bool) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            session,
            view: View::Charts,
            show_raw,
            raw_offset: 0,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Esc` or `Ctrl+C`.
    ///
    /// Polls crossterm with a 250 ms timeout; everything runs on the calling
    /// thread.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key)
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('m') => self.session.toggle_mode(),
            KeyCode::Left | KeyCode::Char('h') => self.session.select_previous_year(),
            KeyCode::Right | KeyCode::Char('l') => self.session.select_next_year(),
            KeyCode::Char('t') => self.view = self.view.toggled(),
            KeyCode::Char('r') => self.show_raw = !self.show_raw,
            KeyCode::Down | KeyCode::Char('j') if self.show_raw => self.scroll_raw(1),
            KeyCode::Up | KeyCode::Char('k') if self.show_raw => self.scroll_raw(-1),
            KeyCode::PageDown if self.show_raw => self.scroll_raw(RAW_PAGE as isize),
            KeyCode::PageUp if self.show_raw => self.scroll_raw(-(RAW_PAGE as isize)),
            _ => {}
        }
    }

    fn scroll_raw(&mut self, delta: isize) {
        let last = self.session.dataset().len().saturating_sub(1);
        self.raw_offset = self.raw_offset.saturating_add_signed(delta).min(last);
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current state into `frame`.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let dataset = Arc::clone(self.session.dataset());
        let mode = self.session.mode();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Header::new(mode, dataset.len(), &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), outer[0]);

        let (grid_area, raw_area) = if self.show_raw {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(outer[1]);
            (parts[0], Some(parts[1]))
        } else {
            (outer[1], None)
        };

        match self.session.report() {
            Ok(report) => render_grid(frame, grid_area, report, self.view, &self.theme),
            Err(e) => render_error(frame, grid_area, &e.to_string(), &self.theme),
        }

        if let Some(raw_area) = raw_area {
            table_view::render_raw_data(frame, raw_area, &dataset, self.raw_offset, &self.theme);
        }

        frame.render_widget(Paragraph::new(self.footer()), outer[2]);
    }

    fn footer(&self) -> Line<'static> {
        let mut keys = vec![("m", "mode")];
        if self.session.mode().year().is_some() {
            keys.push(("←/→", "year"));
        }
        keys.push(("t", "tables"));
        keys.push(("r", "raw data"));
        if self.show_raw {
            keys.push(("↑/↓", "scroll"));
        }
        keys.push(("q", "quit"));

        let mut spans = Vec::new();
        for (key, action) in keys {
            spans.push(Span::styled(format!(" {key}"), self.theme.info));
            spans.push(Span::styled(format!(" {action} "), self.theme.dim));
        }
        Line::from(spans)
    }
}

/// Lay the report's charts out in a two-column grid.
fn render_grid(frame: &mut Frame, area: Rect, report: &Report, view: View, theme: &Theme) {
    let row_count = report.charts.len().div_ceil(2).max(1);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(area);

    for (r, pair) in report.charts.chunks(2).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[r]);
        for (c, chart) in pair.iter().enumerate() {
            match view {
                View::Charts => chart_view::render_chart(frame, cells[c], chart, theme),
                View::Tables => table_view::render_aggregate_table(
                    frame,
                    cells[c],
                    &chart.title,
                    &chart.aggregate,
                    theme,
                ),
            }
        }
    }
}

fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Report could not be built", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled("Press 'm' to switch mode or 'q' to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Error ")),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
