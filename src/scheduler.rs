//! Poll scheduler and command loop.
//!
//! Drives the state machine from a fixed-interval timer and applies manual
//! commands between ticks. Both run inline on one loop, so there is never more
//! than one poll or command in flight.

use crate::autohide::AutoHideStateMachine;
use crate::config::ConfigError;
use crate::domain::Status;
use crate::idle::IdleClock;
use crate::shell::{ShellError, VisibilityController};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Capacity of the command queue.
const COMMAND_QUEUE: usize = 16;

/// Manual command delivered to the scheduler loop.
#[derive(Debug)]
pub enum Command {
    Show(oneshot::Sender<Result<(), ShellError>>),
    Hide(oneshot::Sender<Result<(), ShellError>>),
    SetTimeout(i64, oneshot::Sender<Result<(), ConfigError>>),
    Status(oneshot::Sender<Status>),
}

/// Errors returned to callers of a `SchedulerHandle`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduler is not running")]
    Closed,
}

/// Cloneable sender side for manual commands.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    /// Request a manual show; resolves once the state machine has applied it.
    pub async fn show(&self) -> Result<(), ControlError> {
        Ok(self.request(Command::Show).await??)
    }

    /// Request a manual hide.
    pub async fn hide(&self) -> Result<(), ControlError> {
        Ok(self.request(Command::Hide).await??)
    }

    /// Change the idle timeout.
    pub async fn set_timeout(&self, seconds: i64) -> Result<(), ControlError> {
        Ok(self
            .request(|reply| Command::SetTimeout(seconds, reply))
            .await??)
    }

    /// Query the current state.
    pub async fn status(&self) -> Result<Status, ControlError> {
        self.request(Command::Status).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControlError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ControlError::Closed)?;
        reply_rx.await.map_err(|_| ControlError::Closed)
    }
}

/// Fixed-interval poll loop.
pub struct Scheduler<I: IdleClock> {
    clock: I,
    interval: Duration,
    commands: mpsc::Receiver<Command>,
}

impl<I: IdleClock> Scheduler<I> {
    /// Create a scheduler and the handle used to send it commands.
    pub fn new(clock: I, interval: Duration) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let scheduler = Self {
            clock,
            interval,
            commands: rx,
        };
        (scheduler, SchedulerHandle { tx })
    }

    /// Run until `cancel` fires.
    ///
    /// The first poll happens one interval after start. A poll or command that
    /// is already executing completes before cancellation is observed.
    pub async fn run<C: VisibilityController>(
        mut self,
        machine: &mut AutoHideStateMachine<C>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Scheduler started, polling every {:?}", self.interval);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    let idle = self.clock.sample();
                    machine.poll(idle);
                }

                Some(command) = self.commands.recv() => {
                    apply(machine, command);
                }
            }
        }

        info!("Scheduler stopped");
    }
}

/// Apply one manual command and send the result back.
fn apply<C: VisibilityController>(machine: &mut AutoHideStateMachine<C>, command: Command) {
    let delivered = match command {
        Command::Show(reply) => reply.send(machine.manual_show()).is_ok(),
        Command::Hide(reply) => reply.send(machine.manual_hide()).is_ok(),
        Command::SetTimeout(seconds, reply) => reply.send(machine.set_timeout(seconds)).is_ok(),
        Command::Status(reply) => reply.send(machine.status()).is_ok(),
    };

    if !delivered {
        debug!("Command caller went away before the reply");
    }
}
