//! Top header bar: title, submission state, required-field progress and the
//! endpoint records go to.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::form::{Field, FormState};
use crate::submission::SubmissionState;
use crate::tui::theme::Theme;

pub(crate) struct HeaderInfo<'a> {
    pub state: SubmissionState,
    /// Required fields holding a value with no error.
    pub complete: usize,
    pub required: usize,
    pub endpoint: &'a str,
}

impl<'a> HeaderInfo<'a> {
    pub fn new(form: &FormState, state: SubmissionState, endpoint: &'a str) -> Self {
        let required: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| form.policy().is_required(*f))
            .collect();
        let complete = required
            .iter()
            .filter(|f| !form.value(**f).trim().is_empty() && form.errors.get(**f).is_empty())
            .count();
        Self {
            state,
            complete,
            required: required.len(),
            endpoint,
        }
    }

    fn progress(&self) -> String {
        format!("{}/{} required", self.complete, self.required)
    }
}

pub(crate) fn draw_header(area: Rect, f: &mut ratatui::Frame, theme: &Theme, info: &HeaderInfo) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    let endpoint_width = (info.endpoint.chars().count() as u16 + 2).min(rows[0].width / 2);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(endpoint_width)])
        .split(rows[0]);

    let progress_color = if info.complete == info.required {
        theme.success
    } else {
        theme.caution
    };
    let title = Line::from(vec![
        Span::styled(
            "CUSTOMER INTAKE",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  //  NEW INDIVIDUAL  ", Style::default().fg(theme.text_dim)),
        Span::styled(
            format!("[{}]", info.state.label()),
            Style::default().fg(theme.state_color(&info.state)),
        ),
        Span::styled(
            format!("  {}", info.progress()),
            Style::default().fg(progress_color),
        ),
    ]);
    f.render_widget(Paragraph::new(title), top[0]);

    let endpoint = Line::from(Span::styled(info.endpoint, Style::default().fg(theme.muted)))
        .right_aligned();
    f.render_widget(Paragraph::new(endpoint), top[1]);

    let rule = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(theme.border),
    ));
    f.render_widget(Paragraph::new(rule), rows[1]);
}
