//! taskbar-autohider - hides the Windows taskbar while the user is idle.
//!
//! Polls system-wide input idle time and toggles taskbar auto-hide, with
//! manual show/hide commands read from stdin.

use taskbar_autohider::autohide::AutoHideStateMachine;
use taskbar_autohider::config::{Config, IdleTimeout};
use taskbar_autohider::control;
use taskbar_autohider::idle;
use taskbar_autohider::present;
use taskbar_autohider::scheduler::Scheduler;
use taskbar_autohider::shell;
use taskbar_autohider::signal;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How long runtime teardown waits for stray background tasks.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Taskbar auto-hider for Windows.
///
/// Hides the taskbar after a period of inactivity and shows it again on input.
#[derive(Parser, Debug)]
#[command(name = "taskbar-autohider")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable dry-run mode (log taskbar commands instead of sending them).
    #[arg(long)]
    dry_run: bool,

    /// Idle timeout in seconds (5-3600), overrides the config file.
    #[arg(short, long)]
    timeout: Option<i64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print events to stdout as JSON lines.
    #[arg(long)]
    print_events: bool,

    /// Do not read show/hide/timeout commands from stdin.
    #[arg(long)]
    no_console: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("taskbar-autohider v{} starting", env!("CARGO_PKG_VERSION"));

    // Load config
    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    if args.dry_run {
        config.dry_run = true;
    }

    if let Some(seconds) = args.timeout {
        let timeout =
            IdleTimeout::new(seconds).with_context(|| format!("Invalid --timeout {seconds}"))?;
        config.idle_timeout_seconds = timeout.seconds();
    }

    if !shell::is_supported() && !config.dry_run {
        error!("Taskbar control is only available on Windows.");
        error!("Use --dry-run to exercise the idle logic on this platform.");
        anyhow::bail!("Unsupported platform");
    }

    info!(
        "Configuration loaded (timeout={} s, dry_run={})",
        config.idle_timeout_seconds, config.dry_run
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(run_daemon(config, args.print_events, !args.no_console));

    // A pending stdin read cannot be cancelled; don't wait for it
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(format!("taskbar_autohider={level}"))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

/// Run the poll loop until an exit signal or a console `quit`, then restore the taskbar.
async fn run_daemon(config: Config, print_events: bool, console: bool) -> Result<()> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let timeout = config.idle_timeout()?;

    // Dropping the machine on any exit path restores the taskbar
    let mut machine =
        AutoHideStateMachine::new(shell::platform_controller(config.dry_run), timeout, events_tx);
    let (scheduler, handle) = Scheduler::new(idle::platform_clock(), config.poll_interval());
    let cancel = CancellationToken::new();

    tokio::spawn(present::present_events(
        events_rx,
        print_events,
        config.notifications,
    ));
    tokio::spawn(signal::cancel_on_signal(signal::exit_signal(), cancel.clone()));

    if console {
        let stdin = BufReader::new(tokio::io::stdin());
        tokio::spawn(control::run_console(stdin, handle, cancel.clone()));
    } else {
        drop(handle);
    }

    info!("Daemon started, watching for inactivity...");
    scheduler.run(&mut machine, cancel).await;

    machine.shutdown();
    info!("taskbar-autohider stopped");
    Ok(())
}
