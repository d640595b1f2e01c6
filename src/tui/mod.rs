//! Fullscreen terminal UI (TUI).
//!
//! A single form screen. Submissions run on the caller's runtime through
//! `pending_action` so the pending banner is drawn before the request starts.

pub(crate) mod input;
pub(crate) mod screens;
pub(crate) mod state;
pub(crate) mod theme;
pub(crate) mod widgets;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;

use crate::config::Config;
use state::*;
use theme::Theme;
use widgets::header::HeaderInfo;

const FRAME_TIME: Duration = Duration::from_millis(16);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Runs until the user quits.
pub(crate) fn run_tui(rt: &tokio::runtime::Runtime, config: &Config) -> Result<()> {
    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(config);

    loop {
        terminal.draw(|f| draw(f.area(), f, &app))?;

        if let Some(action) = app.pending_action.take() {
            match action {
                Action::Submit => input::handle_submit(rt, &mut app),
            }
            continue;
        }

        let timeout = FRAME_TIME.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if input::handle_key(&mut app, key)? {
                    break;
                }
            }
        }

        if app.last_tick.elapsed() >= FRAME_TIME {
            app.last_tick = std::time::Instant::now();
            app.animation.advance();
        }
    }

    Ok(())
}

fn draw(area: Rect, f: &mut ratatui::Frame, app: &App) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(0),    // content
            Constraint::Length(1), // footer
        ])
        .split(area);

    let header = HeaderInfo::new(&app.form, app.submission_state(), &app.endpoint);
    widgets::header::draw_header(layout[0], f, &theme, &header);

    screens::form::draw_form(layout[1], f, app, theme);
    if app.screen == Screen::ErrorModal {
        screens::error::draw_error_modal(layout[1], f, app, theme);
    }

    let mode = match (app.screen, app.mode) {
        (Screen::ErrorModal, _) => "ERROR",
        (Screen::Form, InputMode::Navigate) => "NAV",
        (Screen::Form, InputMode::Edit) => "EDIT",
    };
    let hints: &[(&str, &str)] = match (app.screen, app.mode) {
        (Screen::ErrorModal, _) => &[("Enter/Esc", "Close"), ("Ctrl+Q", "Quit")],
        (Screen::Form, InputMode::Navigate) => &[
            ("↑/↓/Tab", "Field"),
            ("Enter", "Edit"),
            ("S", "Submit"),
            ("Esc", "Quit"),
        ],
        (Screen::Form, InputMode::Edit) => &[
            ("Type", "Edit"),
            ("Tab", "Next"),
            ("Enter/Esc", "Done"),
            ("Ctrl+S", "Submit"),
        ],
    };
    widgets::footer::draw_footer(layout[2], f, &theme, mode, hints);
}
