//! TUI color theme.

use ratatui::style::Color;

use crate::submission::SubmissionState;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub accent: Color,
    pub success: Color,
    pub caution: Color,
    pub critical: Color,

    pub border: Color,
    pub muted: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0, 212, 255),
            success: Color::Rgb(163, 230, 53),
            caution: Color::Rgb(251, 191, 36),
            critical: Color::Rgb(255, 68, 85),
            border: Color::Gray,
            muted: Color::DarkGray,
            text: Color::White,
            text_dim: Color::Gray,
        }
    }
}

impl Theme {
    pub fn state_color(&self, state: &SubmissionState) -> Color {
        match state {
            SubmissionState::Idle => self.muted,
            SubmissionState::Pending => self.accent,
            SubmissionState::Succeeded => self.success,
            SubmissionState::Failed(_) => self.critical,
        }
    }
}
