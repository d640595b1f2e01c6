//! TUI application state types.

use std::time::Instant;

use crate::api::ApiClient;
use crate::config::Config;
use crate::form::{Field, FormState};
use crate::submission::{SubmissionController, SubmissionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Form,
    ErrorModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Navigate,
    Edit,
}

#[derive(Debug, Clone)]
pub(crate) struct ErrorModalState {
    pub title: String,
    pub message: String,
}

#[derive(Debug)]
pub(crate) enum Action {
    Submit,
}

pub(crate) struct AnimationState {
    pub tick: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        FRAMES[(self.tick as usize / 6) % FRAMES.len()]
    }
}

pub(crate) struct App {
    pub screen: Screen,
    pub form: FormState,
    pub field: Field,
    pub mode: InputMode,
    pub controller: SubmissionController<ApiClient>,
    pub endpoint: String,
    pub error_modal: Option<ErrorModalState>,
    pub error_return_screen: Screen,
    pub pending_action: Option<Action>,
    pub last_tick: Instant,
    pub animation: AnimationState,
}

impl App {
    pub fn new(cfg: &Config) -> Self {
        let client = ApiClient::from_config(&cfg.api);
        let endpoint = client.endpoint().to_string();
        let controller = SubmissionController::new(client, cfg.submission.success_display())
            .on_success(|payload| {
                tracing::info!(
                    first_name = %payload.first_name,
                    last_name = %payload.last_name,
                    "customer created"
                );
            });

        Self {
            screen: Screen::Form,
            form: FormState::new(cfg.form.clone()),
            field: Field::FirstName,
            mode: InputMode::Navigate,
            controller,
            endpoint,
            error_modal: None,
            error_return_screen: Screen::Form,
            pending_action: None,
            last_tick: Instant::now(),
            animation: AnimationState::new(),
        }
    }

    /// Submission state as shown in the banner. A queued submit counts as
    /// pending so the spinner is drawn before the request blocks the loop.
    pub fn submission_state(&self) -> SubmissionState {
        if matches!(self.pending_action, Some(Action::Submit)) {
            SubmissionState::Pending
        } else {
            self.controller.state()
        }
    }

    pub fn set_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        if self.screen != Screen::ErrorModal {
            self.error_return_screen = self.screen;
        }
        self.error_modal = Some(ErrorModalState {
            title: title.into(),
            message: message.into(),
        });
        self.screen = Screen::ErrorModal;
    }

    pub fn close_modal(&mut self) {
        self.error_modal = None;
        self.screen = self.error_return_screen;
    }
}
