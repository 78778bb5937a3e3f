//! Error type shared by the Drilldown crates.
//!
//! Codes are dotted and scoped by the crate that raises them: `dom.*`, `svg.parse.*`,
//! `nav.url.*`, `overlay.policy.*` and `shell.*`.

use core::fmt;

/// Result alias used across the workspace.
pub type DrillResult<T> = Result<T, DrillError>;

/// Workspace error: a stable dotted code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillError {
    pub code: &'static str,
    pub message: String,
}

impl DrillError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for DrillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for DrillError {}
