//! TUI screen drawing functions.

pub(crate) mod error;
pub(crate) mod form;
