//! taskbar-autohider - keeps the Windows taskbar out of the way while you are idle.
//!
//! The taskbar is switched to auto-hide after a configurable period without
//! keyboard or mouse input and back to always-on-top as soon as input resumes.
//! Manual show/hide commands override the idle logic.

pub mod autohide;
pub mod config;
pub mod control;
pub mod domain;
pub mod idle;
pub mod present;
pub mod scheduler;
pub mod shell;
pub mod signal;

pub use autohide::{ACTIVE_THRESHOLD, AutoHideStateMachine, Transition};
pub use config::{Config, ConfigError, IdleTimeout};
pub use domain::{ControlMode, Event, NotificationKind, Status, VisibilityState};
pub use idle::IdleClock;
pub use scheduler::{ControlError, Scheduler, SchedulerHandle};
pub use shell::{ShellError, VisibilityController};
