//! Task handles, lifecycle state, and cancellation.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Notify};

use crate::core::SchedulerError;

/// Identifier of a scheduled task, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Lifecycle state of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Waiting for its delay or for room in the window.
    Pending,
    /// Admitted; the action has run or is running.
    Admitted,
    /// Cancelled before admission; the action never runs.
    Cancelled,
}

const PENDING: u8 = 0;
const ADMITTED: u8 = 1;
const CANCELLED: u8 = 2;

impl TaskState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            ADMITTED => Self::Admitted,
            CANCELLED => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// True for `Admitted` and `Cancelled`.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Shared state between a task's driver and everyone holding its handle.
///
/// The single `Pending -> Admitted | Cancelled` transition is a CAS, so exactly
/// one of admission and cancellation wins.
#[derive(Debug)]
pub(crate) struct TaskControl {
    state: AtomicU8,
    wake: Notify,
}

impl TaskControl {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            wake: Notify::new(),
        }
    }

    pub(crate) fn state(&self) -> TaskState {
        TaskState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Claim the task for admission. Fails if it was cancelled first.
    pub(crate) fn try_admit(&self) -> bool {
        self.transition(ADMITTED)
    }

    /// Claim the task for cancellation and wake its driver. Fails if already terminal.
    pub(crate) fn try_cancel(&self) -> bool {
        let won = self.transition(CANCELLED);
        if won {
            // notify_one stores a permit if the driver is between waits.
            self.wake.notify_one();
        }
        won
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` if the task was cancelled.
    pub(crate) async fn wait(&self, duration: Duration) -> bool {
        if self.state() == TaskState::Cancelled {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => self.state() != TaskState::Cancelled,
            () = self.wake.notified() => false,
        }
    }
}

/// Cloneable cancellation capability detached from the task's completion channel.
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: TaskId,
    control: Arc<TaskControl>,
}

impl CancelToken {
    /// Task this token cancels.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Cancel the task if it has not been admitted. Returns `true` if this call cancelled it.
    pub fn cancel(&self) -> bool {
        self.control.try_cancel()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.control.state()
    }
}

/// Handle returned by `schedule`.
///
/// Dropping the handle does not cancel the task; the action still runs once
/// admitted and its outcome is discarded.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    control: Arc<TaskControl>,
    outcome: oneshot::Receiver<Result<(), SchedulerError>>,
}

impl TaskHandle {
    pub(crate) fn new(
        id: TaskId,
        control: Arc<TaskControl>,
        outcome: oneshot::Receiver<Result<(), SchedulerError>>,
    ) -> Self {
        Self {
            id,
            control,
            outcome,
        }
    }

    /// Task identifier.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.control.state()
    }

    /// Cancel the task if it has not been admitted. Returns `true` if this call cancelled it.
    pub fn cancel(&self) -> bool {
        self.control.try_cancel()
    }

    /// Detached, cloneable cancellation capability for this task.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            id: self.id,
            control: Arc::clone(&self.control),
        }
    }

    /// Wait for the task to resolve.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::Cancelled`] if the task was cancelled before admission.
    /// - [`SchedulerError::ActionFailed`] / [`SchedulerError::ActionPanicked`] if the
    ///   admitted action failed.
    /// - [`SchedulerError::Abandoned`] if the driving task was dropped by the runtime.
    pub async fn join(self) -> Result<(), SchedulerError> {
        self.outcome
            .await
            .unwrap_or_else(|_| Err(SchedulerError::Abandoned))
    }
}
