//! Domain types for taskbar visibility control.

use serde::Deserialize;
use serde::Serialize;

/// Taskbar visibility as last commanded by this process.
///
/// Mirrors the state we asked the shell for; the real shell state is never
/// read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    #[default]
    Shown,
    Hidden,
}

impl VisibilityState {
    /// Get the state as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

/// Who currently governs visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Idle-time thresholds decide.
    #[default]
    Automatic,
    /// A manual hide is holding; polling does nothing until the next manual show.
    Manual,
}

impl ControlMode {
    /// Get the mode as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

/// Kind of on-screen notice the presentation layer should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    AutoHidden,
    Shown,
    Hidden,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoHidden => "auto-hidden",
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

/// Outbound event for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Transient notice (balloon tip, toast, log line).
    Notification {
        kind: NotificationKind,
        message: String,
    },
    /// An OS call failed during automatic polling.
    Failure { context: String, detail: String },
}

impl Event {
    /// Create a notification event.
    pub fn notification(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::Notification {
            kind,
            message: message.into(),
        }
    }

    /// Create a failure event.
    pub fn failure(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Failure {
            context: context.into(),
            detail: detail.into(),
        }
    }
}

/// Snapshot of the state machine, answered to `status` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub visibility: VisibilityState,
    pub mode: ControlMode,
    pub timeout_seconds: u64,
}
