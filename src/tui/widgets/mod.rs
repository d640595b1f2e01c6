//! Reusable TUI widget components.

pub(crate) mod footer;
pub(crate) mod header;
