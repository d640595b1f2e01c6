//! TUI keyboard input handling.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::submission::SubmitOutcome;

use super::state::*;

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.screen {
        Screen::Form => handle_form_key(app, key),
        Screen::ErrorModal => handle_error_modal_key(app, key),
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        request_submit(app);
        return Ok(false);
    }

    match app.mode {
        InputMode::Navigate => match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::BackTab => {
                app.form.touch(app.field);
                app.field = app.field.prev();
            }
            KeyCode::Down | KeyCode::Tab => {
                app.form.touch(app.field);
                app.field = app.field.next();
            }
            KeyCode::Enter => app.mode = InputMode::Edit,
            KeyCode::Char('s') | KeyCode::Char('S') => request_submit(app),
            _ => {}
        },
        InputMode::Edit => match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                app.form.touch(app.field);
                app.mode = InputMode::Navigate;
            }
            KeyCode::Tab => {
                app.form.touch(app.field);
                app.field = app.field.next();
            }
            KeyCode::BackTab => {
                app.form.touch(app.field);
                app.field = app.field.prev();
            }
            KeyCode::Backspace => app.form.pop_char(app.field),
            KeyCode::Char(c) => app.form.push_char(app.field, c),
            _ => {}
        },
    }
    Ok(false)
}

fn handle_error_modal_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
        app.close_modal();
    }
    Ok(false)
}

/// Queue a submit for the main loop. Invalid forms only reveal their errors.
fn request_submit(app: &mut App) {
    if app.pending_action.is_some() || app.controller.is_pending() {
        debug!("submit ignored, a request is already pending");
        return;
    }
    app.mode = InputMode::Navigate;
    if app.form.attempt_submit().is_none() {
        if let Some(first) = app.form.errors.fields().next() {
            app.field = first;
        }
        return;
    }
    app.pending_action = Some(Action::Submit);
}

pub(crate) fn handle_submit(rt: &tokio::runtime::Runtime, app: &mut App) {
    let Some(record) = app.form.attempt_submit() else {
        return;
    };

    let outcome = rt.block_on(app.controller.submit(&record));
    app.form.apply_outcome(&outcome);

    match outcome {
        SubmitOutcome::Succeeded => app.field = crate::form::Field::FirstName,
        SubmitOutcome::Failed {
            message,
            field_errors,
        } => {
            let mut body = message;
            if !field_errors.is_empty() {
                body.push_str("\n\n");
                body.push_str(&field_errors.to_lines().join("\n"));
            }
            app.set_error("Submission failed", body);
        }
        SubmitOutcome::Ignored => {}
    }
}
