//! Auto-hide state machine.
//!
//! Arbitrates between idle-driven and manual taskbar control:
//! - Hide once idle time reaches the configured timeout
//! - Show again as soon as input resumes (idle below `ACTIVE_THRESHOLD`)
//! - A manual hide suspends both rules until the next manual show
//!
//! The two thresholds never overlap, but at the minimum timeout (5 s) they
//! touch: idle of 5 s hides, idle of 4 s shows, and there is no band in
//! between where a hidden taskbar simply stays hidden.

use crate::config::{ConfigError, IdleTimeout, MIN_TIMEOUT_SECONDS};
use crate::domain::{ControlMode, Event, NotificationKind, Status, VisibilityState};
use crate::shell::{ShellError, VisibilityController};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

/// Idle time below which the user counts as active again.
pub const ACTIVE_THRESHOLD_SECONDS: u64 = 5;

/// `ACTIVE_THRESHOLD_SECONDS` as a duration.
pub const ACTIVE_THRESHOLD: Duration = Duration::from_secs(ACTIVE_THRESHOLD_SECONDS);

// Hide fires at idle >= timeout, show at idle < ACTIVE_THRESHOLD. The two
// ranges must stay disjoint for every accepted timeout; equality is allowed
// and leaves no dead band at the minimum timeout.
const _: () = assert!(ACTIVE_THRESHOLD_SECONDS <= MIN_TIMEOUT_SECONDS);

/// Decision from evaluating an idle sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Put the taskbar into auto-hide.
    Hide,
    /// Bring the taskbar back.
    Show,
    /// Leave everything as is.
    Stay,
}

/// Taskbar visibility state machine.
///
/// Owned by the scheduler loop; every entry point takes `&mut self`, so ticks
/// and manual commands are serialized by construction.
pub struct AutoHideStateMachine<C: VisibilityController> {
    controller: C,
    events: UnboundedSender<Event>,
    visibility: VisibilityState,
    mode: ControlMode,
    timeout: IdleTimeout,
    shut_down: bool,
}

impl<C: VisibilityController> AutoHideStateMachine<C> {
    /// Create a state machine in `(Shown, Automatic)` with the given timeout.
    pub fn new(controller: C, timeout: IdleTimeout, events: UnboundedSender<Event>) -> Self {
        Self {
            controller,
            events,
            visibility: VisibilityState::Shown,
            mode: ControlMode::Automatic,
            timeout,
            shut_down: false,
        }
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn timeout(&self) -> IdleTimeout {
        self.timeout
    }

    /// Snapshot of visibility, mode and timeout.
    pub fn status(&self) -> Status {
        Status {
            visibility: self.visibility,
            mode: self.mode,
            timeout_seconds: self.timeout.seconds(),
        }
    }

    /// Decide what a poll with this idle sample should do, without doing it.
    pub fn evaluate(&self, idle: Duration) -> Transition {
        if self.mode == ControlMode::Manual {
            return Transition::Stay;
        }

        match self.visibility {
            VisibilityState::Shown if idle >= self.timeout.as_duration() => Transition::Hide,
            VisibilityState::Hidden if idle < ACTIVE_THRESHOLD => Transition::Show,
            _ => Transition::Stay,
        }
    }

    /// One evaluation cycle against a freshly sampled idle time.
    ///
    /// Controller failures are logged and reported as `Event::Failure`; state is
    /// left unchanged so the next poll retries.
    pub fn poll(&mut self, idle: Duration) {
        let transition = self.evaluate(idle);
        trace!(
            "Poll: idle={:?}, state={}/{}, decision={:?}",
            idle,
            self.visibility.as_str(),
            self.mode.as_str(),
            transition
        );

        match transition {
            Transition::Hide => match self.controller.set(true) {
                Ok(()) => {
                    self.visibility = VisibilityState::Hidden;
                    info!("Taskbar auto-hidden after {:?} idle", idle);
                    self.emit(Event::notification(
                        NotificationKind::AutoHidden,
                        format!(
                            "Taskbar auto-hidden after {} s of inactivity",
                            self.timeout.seconds()
                        ),
                    ));
                }
                Err(e) => self.report_poll_failure("auto-hide", e),
            },
            Transition::Show => match self.controller.set(false) {
                Ok(()) => {
                    self.visibility = VisibilityState::Shown;
                    debug!("User active again, taskbar shown");
                }
                Err(e) => self.report_poll_failure("auto-show", e),
            },
            Transition::Stay => {}
        }
    }

    /// Show the taskbar and hand control back to idle detection.
    pub fn manual_show(&mut self) -> Result<(), ShellError> {
        self.controller.set(false)?;
        self.visibility = VisibilityState::Shown;
        self.mode = ControlMode::Automatic;
        info!("Taskbar shown manually, automatic mode resumed");
        self.emit(Event::notification(NotificationKind::Shown, "Taskbar shown"));
        Ok(())
    }

    /// Hide the taskbar and hold it hidden regardless of activity.
    pub fn manual_hide(&mut self) -> Result<(), ShellError> {
        self.controller.set(true)?;
        self.visibility = VisibilityState::Hidden;
        self.mode = ControlMode::Manual;
        info!("Taskbar hidden manually");
        self.emit(Event::notification(NotificationKind::Hidden, "Taskbar hidden"));
        Ok(())
    }

    /// Replace the idle timeout; takes effect on the next poll.
    pub fn set_timeout(&mut self, seconds: i64) -> Result<(), ConfigError> {
        let timeout = IdleTimeout::new(seconds)?;
        if timeout != self.timeout {
            info!(
                "Idle timeout changed: {} s -> {} s",
                self.timeout.seconds(),
                timeout.seconds()
            );
        }
        self.timeout = timeout;
        Ok(())
    }

    /// Restore the taskbar to always-on-top. Best effort, runs at most once.
    ///
    /// Called explicitly on the normal exit path; `Drop` calls it otherwise.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        match self.controller.set(false) {
            Ok(()) => {
                self.visibility = VisibilityState::Shown;
                info!("Taskbar restored");
            }
            Err(e) => warn!("Failed to restore taskbar on exit: {}", e),
        }
    }

    fn report_poll_failure(&self, context: &str, error: ShellError) {
        warn!("Failed to {} taskbar: {}", context, error);
        self.emit(Event::failure(context, error.to_string()));
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            trace!("No event listener, dropping event");
        }
    }
}

impl<C: VisibilityController> Drop for AutoHideStateMachine<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::mock::MockController;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn setup() -> (
        AutoHideStateMachine<MockController>,
        MockController,
        UnboundedReceiver<Event>,
    ) {
        let mock = MockController::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let machine = AutoHideStateMachine::new(mock.clone(), IdleTimeout::default(), tx);
        (machine, mock, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn notification_kinds(events: &[Event]) -> Vec<NotificationKind> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Notification { kind, .. } => Some(*kind),
                Event::Failure { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let (machine, mock, _rx) = setup();
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);
        assert_eq!(machine.timeout().seconds(), 30);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_below_timeout_no_call() {
        let (mut machine, mock, mut rx) = setup();
        for idle in [0, 1, 5, 10, 29] {
            machine.poll(secs(idle));
        }
        machine.poll(Duration::from_millis(29_999));

        assert!(mock.calls().is_empty());
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_scenario_a_idle_hides_once() {
        let (mut machine, mock, mut rx) = setup();

        machine.poll(secs(10));
        assert!(mock.calls().is_empty());
        assert_eq!(machine.visibility(), VisibilityState::Shown);

        machine.poll(secs(31));
        assert_eq!(mock.calls(), vec![true]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(machine.mode(), ControlMode::Automatic);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![Event::notification(
                NotificationKind::AutoHidden,
                "Taskbar auto-hidden after 30 s of inactivity"
            )]
        );

        // Still idle: no repeated OS calls
        machine.poll(secs(32));
        machine.poll(secs(600));
        assert_eq!(mock.calls(), vec![true]);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_exact_timeout_hides() {
        let (mut machine, mock, _rx) = setup();
        machine.poll(secs(30));
        assert_eq!(mock.calls(), vec![true]);
    }

    #[test]
    fn test_scenario_b_activity_reshows_silently() {
        let (mut machine, mock, mut rx) = setup();
        machine.poll(secs(31));
        drain(&mut rx);

        machine.poll(secs(2));
        assert_eq!(mock.calls(), vec![true, false]);
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_hidden_between_thresholds_stays() {
        let (mut machine, mock, _rx) = setup();
        machine.poll(secs(31));

        // Not idle enough to hide, not active enough to show
        machine.poll(secs(5));
        machine.poll(secs(20));
        assert_eq!(mock.calls(), vec![true]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
    }

    #[test]
    fn test_min_timeout_has_no_dead_band() {
        let (mut machine, mock, _rx) = setup();
        machine.set_timeout(5).unwrap();

        machine.poll(secs(4));
        assert!(mock.calls().is_empty());

        machine.poll(secs(5));
        // Hidden at exactly the threshold: neither rule fires
        machine.poll(secs(5));
        assert_eq!(mock.calls(), vec![true]);

        // One second below flips straight back, and up again
        machine.poll(secs(4));
        machine.poll(secs(5));
        machine.poll(secs(4));
        assert_eq!(mock.calls(), vec![true, false, true, false]);
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);
    }

    #[test]
    fn test_scenario_c_manual_override() {
        let (mut machine, mock, mut rx) = setup();

        machine.manual_hide().unwrap();
        assert_eq!(mock.calls(), vec![true]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(machine.mode(), ControlMode::Manual);

        machine.poll(secs(0));
        assert_eq!(mock.calls(), vec![true]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);

        machine.manual_show().unwrap();
        assert_eq!(mock.calls(), vec![true, false]);
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);

        assert_eq!(
            notification_kinds(&drain(&mut rx)),
            vec![NotificationKind::Hidden, NotificationKind::Shown]
        );
    }

    #[test]
    fn test_manual_mode_ignores_every_idle_value() {
        let (mut machine, mock, _rx) = setup();
        machine.manual_hide().unwrap();

        for idle in [0, 1, 4, 5, 29, 30, 31, 3600, 86_400] {
            assert_eq!(machine.evaluate(secs(idle)), Transition::Stay);
            machine.poll(secs(idle));
        }
        assert_eq!(mock.calls(), vec![true]);
        assert_eq!(machine.mode(), ControlMode::Manual);
    }

    #[test]
    fn test_scenario_d_rejected_manual_hide() {
        let (mut machine, mock, mut rx) = setup();
        mock.fail_next(ShellError::CommandRejected);

        let result = machine.manual_hide();
        assert_eq!(result, Err(ShellError::CommandRejected));
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_failed_manual_show_keeps_manual_mode() {
        let (mut machine, mock, mut rx) = setup();
        machine.manual_hide().unwrap();
        drain(&mut rx);

        mock.fail_next(ShellError::TargetNotFound);
        assert_eq!(machine.manual_show(), Err(ShellError::TargetNotFound));
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(machine.mode(), ControlMode::Manual);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_manual_show_from_automatic_hidden() {
        let (mut machine, _mock, _rx) = setup();
        machine.poll(secs(31));
        assert_eq!(machine.visibility(), VisibilityState::Hidden);

        machine.manual_show().unwrap();
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(machine.mode(), ControlMode::Automatic);
    }

    #[test]
    fn test_poll_failure_reports_and_retries() {
        let (mut machine, mock, mut rx) = setup();
        mock.fail_next(ShellError::TargetNotFound);

        machine.poll(secs(31));
        assert_eq!(machine.visibility(), VisibilityState::Shown);
        assert_eq!(
            drain(&mut rx),
            vec![Event::failure("auto-hide", "Could not find taskbar window")]
        );

        // Next poll simply tries again
        machine.poll(secs(32));
        assert_eq!(mock.calls(), vec![true, true]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(
            notification_kinds(&drain(&mut rx)),
            vec![NotificationKind::AutoHidden]
        );
    }

    #[test]
    fn test_failed_auto_show_stays_hidden() {
        let (mut machine, mock, mut rx) = setup();
        machine.poll(secs(31));
        drain(&mut rx);

        mock.fail_next(ShellError::CommandRejected);
        machine.poll(secs(1));
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [Event::Failure { context, .. }] if context == "auto-show"
        ));
    }

    #[test]
    fn test_set_timeout_bounds() {
        let (mut machine, _mock, _rx) = setup();

        assert_eq!(machine.set_timeout(3), Err(ConfigError::OutOfRange(3)));
        assert_eq!(machine.timeout().seconds(), 30);

        assert_eq!(machine.set_timeout(3600), Ok(()));
        assert_eq!(machine.timeout().seconds(), 3600);

        assert_eq!(machine.set_timeout(3601), Err(ConfigError::OutOfRange(3601)));
        assert_eq!(machine.timeout().seconds(), 3600);
    }

    #[test]
    fn test_set_timeout_applies_on_next_poll() {
        let (mut machine, mock, _rx) = setup();
        machine.set_timeout(60).unwrap();

        machine.poll(secs(31));
        assert!(mock.calls().is_empty());

        machine.set_timeout(10).unwrap();
        machine.poll(secs(31));
        assert_eq!(mock.calls(), vec![true]);
    }

    #[test]
    fn test_shutdown_restores_from_every_state() {
        // (Shown, Automatic)
        let (mut machine, mock, _rx) = setup();
        machine.shutdown();
        assert_eq!(mock.calls(), vec![false]);

        // (Hidden, Automatic)
        let (mut machine, mock, _rx) = setup();
        machine.poll(secs(31));
        machine.shutdown();
        assert_eq!(mock.calls(), vec![true, false]);
        assert_eq!(machine.visibility(), VisibilityState::Shown);

        // (Hidden, Manual)
        let (mut machine, mock, _rx) = setup();
        machine.manual_hide().unwrap();
        machine.shutdown();
        assert_eq!(mock.calls(), vec![true, false]);
    }

    #[test]
    fn test_shutdown_swallows_failure() {
        let (mut machine, mock, _rx) = setup();
        machine.manual_hide().unwrap();
        mock.fail_next(ShellError::TargetNotFound);

        machine.shutdown();
        assert_eq!(mock.calls(), vec![true, false]);
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
    }

    #[test]
    fn test_shutdown_runs_once() {
        let (mut machine, mock, _rx) = setup();
        machine.shutdown();
        machine.shutdown();
        drop(machine);
        assert_eq!(mock.calls(), vec![false]);
    }

    #[test]
    fn test_drop_restores_taskbar() {
        let (mut machine, mock, _rx) = setup();
        machine.manual_hide().unwrap();
        drop(machine);
        assert_eq!(mock.calls(), vec![true, false]);
    }

    #[test]
    fn test_events_dropped_without_listener() {
        let (mut machine, mock, rx) = setup();
        drop(rx);
        machine.poll(secs(31));
        assert_eq!(machine.visibility(), VisibilityState::Hidden);
        assert_eq!(mock.calls(), vec![true]);
    }

    #[test]
    fn test_status_snapshot() {
        let (mut machine, _mock, _rx) = setup();
        machine.manual_hide().unwrap();
        assert_eq!(
            machine.status(),
            Status {
                visibility: VisibilityState::Hidden,
                mode: ControlMode::Manual,
                timeout_seconds: 30,
            }
        );
    }
}
