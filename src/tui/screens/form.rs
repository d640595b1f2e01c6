//! Customer form screen: status banner, field list with inline errors.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::form::Field;
use crate::submission::SubmissionState;
use crate::tui::state::{App, InputMode};
use crate::tui::theme::Theme;

const LABEL_WIDTH: usize = 16;

pub(crate) fn draw_form(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // status banner
            Constraint::Min(0),    // fields
        ])
        .split(area);

    draw_status(layout[0], f, app, &theme);
    draw_fields(layout[1], f, app, &theme);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let state = app.submission_state();
    let color = theme.state_color(&state);

    let line = match &state {
        SubmissionState::Idle => Line::from(Span::styled(
            "  Ready. Fill in the fields, then press S to submit.",
            Style::default().fg(theme.muted),
        )),
        SubmissionState::Pending => Line::from(vec![
            Span::styled(
                format!("  {}  ", app.animation.spinner_char()),
                Style::default().fg(color),
            ),
            Span::styled(
                "Submitting...",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
        ]),
        SubmissionState::Succeeded => Line::from(Span::styled(
            "  ✓  Form submitted successfully!",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        SubmissionState::Failed(message) => Line::from(Span::styled(
            format!("  Error: {message}"),
            Style::default().fg(color),
        )),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_fields(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_row = 0usize;

    for field in Field::ALL {
        let selected = field == app.field;
        if selected {
            selected_row = lines.len();
        }
        let required = app.form.policy().is_required(field);
        lines.push(field_line(
            field,
            app.form.value(field),
            required,
            selected,
            app.mode,
            theme,
        ));
        for message in app.form.visible_errors(field) {
            lines.push(Line::from(Span::styled(
                format!("{:width$}  {message}", "", width = LABEL_WIDTH + 3),
                Style::default().fg(theme.critical),
            )));
        }
    }

    if app.form.submit_attempted && app.form.policy().require_contact {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "   Either a phone number or an email address is needed.",
            Style::default().fg(theme.muted),
        )));
    }

    // Keep the selected row on screen for short terminals.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_row.saturating_sub(visible.saturating_sub(2));

    let border = if app.mode == InputMode::Edit {
        theme.accent
    } else {
        theme.border
    };
    let mut title = vec![Span::styled(
        " Individual ",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )];
    if app.form.is_valid() {
        title.push(Span::styled("ready ", Style::default().fg(theme.success)));
    }
    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));

    let para = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    f.render_widget(para, area);
}

fn field_line<'a>(
    field: Field,
    value: &'a str,
    required: bool,
    selected: bool,
    mode: InputMode,
    theme: &Theme,
) -> Line<'a> {
    let editing = selected && mode == InputMode::Edit;

    let label_style = if selected {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };

    let (display, value_style) = if value.is_empty() && !editing {
        (field.placeholder(), Style::default().fg(theme.muted))
    } else if editing {
        (
            value,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::UNDERLINED),
        )
    } else {
        (value, Style::default().fg(theme.text))
    };

    let selector = if selected { "›" } else { " " };
    let marker = if required { "*" } else { " " };
    let cursor = if editing { "▏" } else { "" };

    Line::from(vec![
        Span::styled(format!(" {selector} "), label_style),
        Span::styled(
            format!("{:<width$}", field.label(), width = LABEL_WIDTH - 1),
            label_style,
        ),
        Span::styled(marker, Style::default().fg(theme.caution)),
        Span::raw(" "),
        Span::styled(display, value_style),
        Span::styled(cursor, Style::default().fg(theme.accent)),
    ])
}
