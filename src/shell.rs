//! Taskbar visibility control.
//!
//! This module provides the controller abstraction the state machine drives,
//! plus the platform and dry-run implementations.

#[cfg(windows)]
mod win32;

use thiserror::Error;
use tracing::info;
#[cfg(not(windows))]
use tracing::warn;

#[cfg(windows)]
pub use win32::TrayWndController;

/// Errors that can occur while commanding the shell.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    #[error("Could not find taskbar window")]
    TargetNotFound,

    #[error("Shell rejected taskbar state change")]
    CommandRejected,
}

/// Something that can put the taskbar into auto-hide or always-on-top state.
///
/// Implementations must re-resolve the shell surface on every call and be
/// safe to call redundantly.
pub trait VisibilityController: Send {
    /// Set the taskbar to auto-hide (`true`) or always-on-top (`false`).
    fn set(&self, hidden: bool) -> Result<(), ShellError>;
}

impl<T: VisibilityController + ?Sized> VisibilityController for Box<T> {
    fn set(&self, hidden: bool) -> Result<(), ShellError> {
        (**self).set(hidden)
    }
}

/// Controller that only logs what it would do.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunController;

impl VisibilityController for DryRunController {
    fn set(&self, hidden: bool) -> Result<(), ShellError> {
        info!(
            "[DRY RUN] Would set taskbar state: {}",
            if hidden { "auto-hide" } else { "always-on-top" }
        );
        Ok(())
    }
}

/// Stand-in for hosts without a Windows shell: the taskbar is never found.
#[cfg(not(windows))]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedController;

#[cfg(not(windows))]
impl VisibilityController for UnsupportedController {
    fn set(&self, _hidden: bool) -> Result<(), ShellError> {
        warn!("Taskbar control is only available on Windows");
        Err(ShellError::TargetNotFound)
    }
}

/// Returns true if this build can drive a real taskbar.
pub fn is_supported() -> bool {
    cfg!(windows)
}

/// Pick the controller for this platform, or the dry-run one if requested.
pub fn platform_controller(dry_run: bool) -> Box<dyn VisibilityController> {
    if dry_run {
        return Box::new(DryRunController);
    }

    #[cfg(windows)]
    {
        Box::new(TrayWndController)
    }

    #[cfg(not(windows))]
    {
        Box::new(UnsupportedController)
    }
}
