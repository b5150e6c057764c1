//! UI-state helpers shared by both flow controllers.

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Severity of an inline status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Neutral progress information.
    Info,
    /// Operation finished.
    Success,
    /// Operation failed.
    Error,
}

/// Inline status message rendered next to a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    /// Severity.
    pub kind: StatusKind,
    /// Text shown to the user.
    pub text: String,
}

impl StatusMessage {
    /// Create an info message.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    /// Create a success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    /// Create an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    /// Error message prefixed with the failure marker.
    pub fn failure(error: &Error) -> Self {
        Self::error(format!("❌ {}", error.user_message()))
    }

    /// CSS class list for the status element.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            StatusKind::Info => "status-msg",
            StatusKind::Success => "status-msg is-success",
            StatusKind::Error => "status-msg is-error",
        }
    }
}

/// Busy/idle toggle guarding one kind of action.
///
/// While held, the matching trigger control is disabled and a second action
/// of the same kind is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusyFlag {
    busy: bool,
}

impl BusyFlag {
    /// An idle flag.
    #[must_use]
    pub const fn new() -> Self {
        Self { busy: false }
    }

    /// Whether an action is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark the action as started.
    ///
    /// Fails with [`Error::Busy`] if one is already in flight.
    pub fn acquire(&mut self, action: &'static str) -> Result<()> {
        if self.busy {
            warn!("{} rejected: already in progress", action);
            return Err(Error::Busy(action));
        }
        self.busy = true;
        Ok(())
    }

    /// Mark the action as finished. Releasing an idle flag is harmless.
    pub const fn release(&mut self) {
        self.busy = false;
    }
}
