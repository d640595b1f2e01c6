//! Submission module
//!
//! Turns a validated record into the wire payload and drives the single
//! in-flight request through [`SubmissionController`].

mod controller;
mod payload;

pub use controller::{SubmissionController, SubmissionState, SubmitOutcome, Transport};
pub use payload::SubmissionPayload;
