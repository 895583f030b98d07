//! Process exit signals.
//!
//! On Windows a closed console window, a logoff or a system shutdown must
//! restore the taskbar just like Ctrl-C does, so all of them end the daemon.

use std::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait for the first signal that should stop the daemon and name it.
#[cfg(windows)]
pub async fn exit_signal() -> io::Result<&'static str> {
    use tokio::signal::windows;

    let mut close = windows::ctrl_close()?;
    let mut logoff = windows::ctrl_logoff()?;
    let mut shutdown = windows::ctrl_shutdown()?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "Ctrl-C"),
        _ = close.recv() => Ok("console close"),
        _ = logoff.recv() => Ok("logoff"),
        _ = shutdown.recv() => Ok("system shutdown"),
    }
}

/// Wait for the first signal that should stop the daemon and name it.
#[cfg(not(windows))]
pub async fn exit_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl-C")
}

/// Cancel `cancel` once `signal` reports a stop request.
///
/// If the listener cannot be installed the daemon keeps running; it can still
/// be stopped from the console.
pub async fn cancel_on_signal<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = io::Result<&'static str>>,
{
    match signal.await {
        Ok(name) => {
            info!("{} received, shutting down", name);
            cancel.cancel();
        }
        Err(e) => warn!("Failed to listen for exit signals: {}", e),
    }
}
