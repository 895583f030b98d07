//! Idle time detection.
//!
//! Provides the `IdleClock` abstraction sampled by the scheduler on every tick.

#[cfg(windows)]
mod win32;

use std::time::Duration;
#[cfg(not(windows))]
use tracing::trace;

#[cfg(windows)]
pub use win32::LastInputClock;

/// Source of "time since last user input".
///
/// `sample` must not block and must never fail: a read failure is reported
/// as zero idle time so it can never trigger a hide.
pub trait IdleClock: Send {
    /// Elapsed time since the last system-wide keyboard/mouse input.
    fn sample(&self) -> Duration;
}

impl<T: IdleClock + ?Sized> IdleClock for Box<T> {
    fn sample(&self) -> Duration {
        (**self).sample()
    }
}

/// Clock for hosts without an input idle counter; always reports activity.
#[cfg(not(windows))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ActiveClock;

#[cfg(not(windows))]
impl IdleClock for ActiveClock {
    fn sample(&self) -> Duration {
        trace!("No idle counter on this platform, reporting zero idle time");
        Duration::ZERO
    }
}

/// Pick the idle clock for this platform.
pub fn platform_clock() -> Box<dyn IdleClock> {
    #[cfg(windows)]
    {
        Box::new(LastInputClock)
    }

    #[cfg(not(windows))]
    {
        Box::new(ActiveClock)
    }
}
