//! Idle detection via `GetLastInputInfo`.

use super::IdleClock;
use std::time::Duration;
use tracing::{trace, warn};
use windows_sys::Win32::System::SystemInformation::GetTickCount;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

/// Reads the session-wide last input tick from user32.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastInputClock;

impl IdleClock for LastInputClock {
    fn sample(&self) -> Duration {
        let mut info = LASTINPUTINFO {
            cbSize: u32::try_from(std::mem::size_of::<LASTINPUTINFO>()).unwrap_or(u32::MAX),
            dwTime: 0,
        };

        // SAFETY: info is initialized with the correct cbSize and outlives the call.
        let ok = unsafe { GetLastInputInfo(&raw mut info) } != 0;
        if !ok {
            warn!("GetLastInputInfo failed, treating as active");
            return Duration::ZERO;
        }

        // SAFETY: no preconditions.
        let now = unsafe { GetTickCount() };
        let idle = elapsed_ticks(now, info.dwTime);
        trace!("Idle for {:?}", idle);
        idle
    }
}

/// Milliseconds between two 32-bit tick counts, surviving the ~49.7 day wrap.
fn elapsed_ticks(now: u32, last_input: u32) -> Duration {
    Duration::from_millis(u64::from(now.wrapping_sub(last_input)))
}
