//! Submission state machine.
//!
//! `idle -> pending -> succeeded -> (display window) -> idle`
//! `pending -> failed -> pending` on the next submit.
//!
//! Only one request may be in flight. The state lives behind a mutex shared
//! with the timer task that returns a success back to idle.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::form::{FieldErrors, ValidatedRecord};

use super::SubmissionPayload;

/// Sends one payload to the backend.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Pending => "pending",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// What a call to [`SubmissionController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was already pending; nothing was sent.
    Ignored,
    Succeeded,
    Failed {
        message: String,
        /// Per-field errors echoed by the server, if any.
        field_errors: FieldErrors,
    },
}

#[derive(Debug, Default)]
struct Slot {
    state: SubmissionState,
    // Bumped on every accepted submit so stale idle timers can be ignored.
    generation: u64,
}

type SuccessCallback = Box<dyn Fn(&SubmissionPayload) + Send + Sync>;

pub struct SubmissionController<T> {
    transport: T,
    slot: Arc<Mutex<Slot>>,
    success_display: Duration,
    on_success: Option<SuccessCallback>,
}

impl<T: Transport> SubmissionController<T> {
    pub fn new(transport: T, success_display: Duration) -> Self {
        Self {
            transport,
            slot: Arc::new(Mutex::new(Slot::default())),
            success_display,
            on_success: None,
        }
    }

    /// Called once per successful submit, after the state flips to `succeeded`.
    pub fn on_success(
        mut self,
        callback: impl Fn(&SubmissionPayload) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().state.is_pending()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        lock_slot(&self.slot)
    }

    /// Send `record` once. Never returns an error: transport failures end up
    /// in the `failed` state and in the returned outcome.
    pub async fn submit(&self, record: &ValidatedRecord) -> SubmitOutcome {
        let generation = {
            let mut slot = self.lock();
            if slot.state.is_pending() {
                debug!("submit ignored, a request is already pending");
                return SubmitOutcome::Ignored;
            }
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SubmissionState::Pending;
            slot.generation
        };

        let payload = SubmissionPayload::from_record(record);
        info!(generation, "submitting customer record");

        match self.transport.send(&payload).await {
            Ok(()) => {
                self.lock().state = SubmissionState::Succeeded;
                info!(generation, "customer record accepted");
                if let Some(callback) = &self.on_success {
                    callback(&payload);
                }
                self.schedule_idle(generation);
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                let message = err.to_string();
                warn!(generation, error = %message, "customer submission failed");
                self.lock().state = SubmissionState::Failed(message.clone());
                SubmitOutcome::Failed {
                    message,
                    field_errors: err.field_errors(),
                }
            }
        }
    }

    fn schedule_idle(&self, generation: u64) {
        let slot = Arc::clone(&self.slot);
        let delay = self.success_display;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let mut slot = lock_slot(&slot);
                    if slot.generation == generation && slot.state == SubmissionState::Succeeded {
                        debug!(generation, "success display window elapsed");
                        slot.state = SubmissionState::Idle;
                    }
                });
            }
            Err(_) => {
                debug!("no runtime available, success state stays until the next submit");
            }
        }
    }
}

fn lock_slot(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
