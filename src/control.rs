//! Line-based console control.
//!
//! Reads commands such as `show`, `hide` or `timeout 300` from a line stream
//! (stdin in the daemon) and forwards them to the scheduler.

use crate::scheduler::SchedulerHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Show,
    Hide,
    Timeout(i64),
    Status,
    Quit,
}

/// Result of parsing one console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Blank line or comment.
    Empty,
    Command(ControlCommand),
    Invalid(String),
}

/// Parse a single console line.
///
/// Format: COMMAND [ARG]\n, case-insensitive, `#` starts a comment.
pub fn parse_command_line(line: &str) -> ParseOutcome {
    let line = line.split_once('#').map_or(line, |(before, _)| before).trim();
    if line.is_empty() {
        return ParseOutcome::Empty;
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default().to_ascii_lowercase();
    let arg = words.next();

    if words.next().is_some() {
        return ParseOutcome::Invalid(format!("too many arguments: {line}"));
    }

    let command = match (name.as_str(), arg) {
        ("show", None) => ControlCommand::Show,
        ("hide", None) => ControlCommand::Hide,
        ("status", None) => ControlCommand::Status,
        ("quit" | "exit", None) => ControlCommand::Quit,
        ("timeout", Some(value)) => match value.parse::<i64>() {
            Ok(seconds) => ControlCommand::Timeout(seconds),
            Err(_) => return ParseOutcome::Invalid(format!("not a number: {value}")),
        },
        ("timeout", None) => {
            return ParseOutcome::Invalid("timeout needs a value in seconds".to_string());
        }
        (_, Some(_)) if matches!(name.as_str(), "show" | "hide" | "status" | "quit" | "exit") => {
            return ParseOutcome::Invalid(format!("{name} takes no arguments"));
        }
        _ => return ParseOutcome::Invalid(format!("unknown command: {name}")),
    };

    ParseOutcome::Command(command)
}

/// Read commands from `reader` until EOF, `quit`, or cancellation.
///
/// `quit` cancels `cancel`, which stops the scheduler. EOF only stops reading.
pub async fn run_console<R>(reader: R, handle: SchedulerHandle, cancel: CancellationToken)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                trace!("Console line: {}", line.trim());
                match parse_command_line(&line) {
                    ParseOutcome::Empty => {}
                    ParseOutcome::Invalid(reason) => warn!("Ignoring console input: {}", reason),
                    ParseOutcome::Command(ControlCommand::Quit) => {
                        info!("Quit requested from console");
                        cancel.cancel();
                        break;
                    }
                    ParseOutcome::Command(command) => execute(&handle, command).await,
                }
            }
            Ok(None) => {
                debug!("Console input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        }
    }
}

async fn execute(handle: &SchedulerHandle, command: ControlCommand) {
    let result = match command {
        ControlCommand::Show => handle.show().await,
        ControlCommand::Hide => handle.hide().await,
        ControlCommand::Timeout(seconds) => handle.set_timeout(seconds).await,
        ControlCommand::Status => match handle.status().await {
            Ok(status) => {
                info!(
                    "Taskbar {} ({} mode), idle timeout {} s",
                    status.visibility.as_str(),
                    status.mode.as_str(),
                    status.timeout_seconds
                );
                Ok(())
            }
            Err(e) => Err(e),
        },
        ControlCommand::Quit => Ok(()),
    };

    if let Err(e) = result {
        error!("Command {:?} failed: {}", command, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autohide::AutoHideStateMachine;
    use crate::config::IdleTimeout;
    use crate::domain::{ControlMode, VisibilityState};
    use crate::idle::IdleClock;
    use crate::scheduler::Scheduler;
    use crate::shell::mock::MockController;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Busy;

    impl IdleClock for Busy {
        fn sample(&self) -> Duration {
            Duration::ZERO
        }
    }

    fn cmd(c: ControlCommand) -> ParseOutcome {
        ParseOutcome::Command(c)
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command_line("show"), cmd(ControlCommand::Show));
        assert_eq!(parse_command_line("hide\n"), cmd(ControlCommand::Hide));
        assert_eq!(parse_command_line("  STATUS  "), cmd(ControlCommand::Status));
        assert_eq!(parse_command_line("quit"), cmd(ControlCommand::Quit));
        assert_eq!(parse_command_line("exit"), cmd(ControlCommand::Quit));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(
            parse_command_line("timeout 300"),
            cmd(ControlCommand::Timeout(300))
        );
        // Range is checked by the state machine, not the parser
        assert_eq!(
            parse_command_line("timeout -1"),
            cmd(ControlCommand::Timeout(-1))
        );
        assert!(matches!(
            parse_command_line("timeout"),
            ParseOutcome::Invalid(_)
        ));
        assert!(matches!(
            parse_command_line("timeout soon"),
            ParseOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_empty_and_comments() {
        assert_eq!(parse_command_line(""), ParseOutcome::Empty);
        assert_eq!(parse_command_line("   \n"), ParseOutcome::Empty);
        assert_eq!(parse_command_line("# just a note"), ParseOutcome::Empty);
        assert_eq!(
            parse_command_line("hide # for the demo"),
            cmd(ControlCommand::Hide)
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            parse_command_line("dance"),
            ParseOutcome::Invalid("unknown command: dance".to_string())
        );
        assert_eq!(
            parse_command_line("show now"),
            ParseOutcome::Invalid("show takes no arguments".to_string())
        );
        assert!(matches!(
            parse_command_line("timeout 30 40"),
            ParseOutcome::Invalid(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_drives_scheduler() {
        let mock = MockController::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut machine = AutoHideStateMachine::new(mock.clone(), IdleTimeout::default(), tx);
        let (scheduler, handle) = Scheduler::new(Busy, Duration::from_secs(1));
        let cancel = CancellationToken::new();

        let input: &[u8] = b"timeout 90\nbogus\nhide\nstatus\nquit\nshow\n";
        tokio::join!(
            scheduler.run(&mut machine, cancel.clone()),
            run_console(input, handle, cancel.clone()),
        );

        assert!(cancel.is_cancelled());
        assert_eq!(machine.timeout().seconds(), 90);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(machine.mode(), ControlMode::Manual);
        // `show` after `quit` is never read
        assert_eq!(mock.calls(), vec![true]);
    }

    #[tokio::test]
    async fn test_console_eof_does_not_cancel() {
        let (scheduler, handle) = Scheduler::new(Busy, Duration::from_secs(1));
        let cancel = CancellationToken::new();

        let input: &[u8] = b"";
        run_console(input, handle, cancel.clone()).await;

        assert!(!cancel.is_cancelled());
        drop(scheduler);
    }
}
