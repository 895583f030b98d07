//! Win32 taskbar controller.
//!
//! Finds `Shell_TrayWnd` and sends `ABM_SETSTATE` through `SHAppBarMessage`.

use super::{ShellError, VisibilityController};
use tracing::{debug, trace};
use windows_sys::Win32::Foundation::HWND;
use windows_sys::Win32::UI::Shell::{
    ABM_SETSTATE, ABS_ALWAYSONTOP, ABS_AUTOHIDE, APPBARDATA, SHAppBarMessage,
};
use windows_sys::Win32::UI::WindowsAndMessaging::FindWindowW;

/// Window class of the primary taskbar.
const TASKBAR_CLASS: &str = "Shell_TrayWnd";

/// Controller for the primary Windows taskbar.
///
/// Holds no handle: the taskbar is looked up on every call so an Explorer
/// restart never leaves us with a stale window.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrayWndController;

impl VisibilityController for TrayWndController {
    fn set(&self, hidden: bool) -> Result<(), ShellError> {
        let hwnd = find_taskbar().ok_or(ShellError::TargetNotFound)?;
        trace!("Found taskbar window {:?}", hwnd);

        let state = if hidden { ABS_AUTOHIDE } else { ABS_ALWAYSONTOP };
        // SAFETY: APPBARDATA is plain data; all-zero is a valid value.
        let mut abd: APPBARDATA = unsafe { std::mem::zeroed() };
        abd.cbSize = u32::try_from(std::mem::size_of::<APPBARDATA>()).unwrap_or(u32::MAX);
        abd.hWnd = hwnd;
        abd.lParam = state as isize;

        // SAFETY: abd is a fully initialized APPBARDATA that outlives the call.
        let result = unsafe { SHAppBarMessage(ABM_SETSTATE, &raw mut abd) };
        if result == 0 {
            return Err(ShellError::CommandRejected);
        }

        debug!(
            "Taskbar state set to {}",
            if hidden { "auto-hide" } else { "always-on-top" }
        );
        Ok(())
    }
}

/// Encodes a string as a null-terminated wide string.
fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Finds the primary taskbar window handle.
fn find_taskbar() -> Option<HWND> {
    let class_name = wide_string(TASKBAR_CLASS);
    // SAFETY: class_name is null-terminated and lives across the call.
    let hwnd = unsafe { FindWindowW(class_name.as_ptr(), std::ptr::null()) };
    if hwnd.is_null() { None } else { Some(hwnd) }
}
