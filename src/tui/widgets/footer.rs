//! Keybind footer bar with the current input mode.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

pub(crate) fn draw_footer(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    mode: &str,
    hints: &[(&str, &str)],
) {
    let mut spans = vec![
        Span::styled(
            format!(" {mode} "),
            Style::default()
                .fg(theme.text)
                .bg(theme.muted)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.muted)));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(theme.muted),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
