//! Sliding-window admission and the task driver loop.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::core::handle::TaskControl;
use crate::core::stats::SchedulerCounters;
use crate::core::{
    build_audit_event, AdmissionWindow, AppResult, AuditAction, AuditSink, RateLimits,
    SchedulerError, SchedulerStats, TaskHandle, TaskId,
};
use crate::runtime::TokioSpawner;

/// Name given to schedulers built without one.
pub const DEFAULT_SCHEDULER_NAME: &str = "default";

/// Abstraction for spawning task drivers on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admitted,
    Full,
    Cancelled,
}

/// State shared by every clone of a scheduler and every driver it spawned.
struct Gate {
    name: String,
    limits: RateLimits,
    window: Mutex<AdmissionWindow>,
    counters: SchedulerCounters,
    next_id: AtomicU64,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
}

impl Gate {
    /// Prune, check, and claim a slot as one critical section.
    ///
    /// The task's state flips to `Admitted` under the window lock, so a
    /// concurrent cancel either lands before (and no slot is taken) or fails.
    fn try_admit(&self, control: &TaskControl) -> Admission {
        let mut window = self.window.lock();
        // Read under the lock so entries are appended in clock order.
        let now = Instant::now();
        if !window.has_room(now, self.limits.window(), self.limits.capacity()) {
            return Admission::Full;
        }
        if !control.try_admit() {
            return Admission::Cancelled;
        }
        window.record(now);
        Admission::Admitted
    }

    fn occupancy(&self) -> usize {
        let mut window = self.window.lock();
        window.prune(Instant::now(), self.limits.window());
        window.len()
    }

    fn next_vacancy(&self) -> Option<Duration> {
        self.window.lock().time_until_vacancy(
            Instant::now(),
            self.limits.window(),
            self.limits.capacity(),
        )
    }

    fn record_audit(&self, task_id: TaskId, action: AuditAction, detail: Option<String>) {
        if let Some(audit) = self.audit.as_ref() {
            audit
                .lock()
                .record(build_audit_event(task_id, self.name.as_str(), action, detail));
        }
    }

    fn on_cancelled(&self, task_id: TaskId) -> Result<(), SchedulerError> {
        SchedulerCounters::bump(&self.counters.cancelled);
        self.record_audit(task_id, AuditAction::Cancelled, None);
        tracing::debug!("task {} cancelled before admission", task_id);
        Err(SchedulerError::Cancelled)
    }
}

/// Sliding-window rate-limited scheduler.
///
/// Every scheduled action waits for its delay, then for room in the shared
/// [`AdmissionWindow`]: at most `capacity` admissions are recorded inside any
/// trailing `window`. A task that finds the window full re-checks every
/// `retry_interval` until it is admitted or cancelled; there is no retry ceiling.
///
/// Clones share the same window, so a scheduler can be handed to any number of
/// producers.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use rate_gate::core::RateLimitedScheduler;
///
/// # async fn demo() -> Result<(), rate_gate::core::SchedulerError> {
/// let scheduler = RateLimitedScheduler::new(2)?;
/// let handle = scheduler.schedule_fn(|| Ok(()), Duration::ZERO);
/// handle.join().await?;
/// # Ok(())
/// # }
/// ```
pub struct RateLimitedScheduler<S = TokioSpawner> {
    gate: Arc<Gate>,
    spawner: S,
}

impl<S: Clone> Clone for RateLimitedScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            spawner: self.spawner.clone(),
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for RateLimitedScheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedScheduler")
            .field("name", &self.gate.name)
            .field("limits", &self.gate.limits)
            .field("spawner", &self.spawner)
            .finish_non_exhaustive()
    }
}

impl RateLimitedScheduler<TokioSpawner> {
    /// Scheduler admitting `capacity` tasks per second, re-checking every 10ms.
    ///
    /// Drivers are spawned onto the tokio runtime current at each `schedule` call.
    /// Scheduling with no runtime current abandons the task: its `join`
    /// resolves to [`SchedulerError::Abandoned`] and the action never runs.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if `capacity < 1`.
    pub fn new(capacity: usize) -> Result<Self, SchedulerError> {
        Ok(Self::with_limits(RateLimits::per_second(capacity)?))
    }

    /// Scheduler with explicit limits on the ambient tokio runtime.
    pub fn with_limits(limits: RateLimits) -> Self {
        Self::with_spawner(limits, TokioSpawner::ambient())
    }
}

impl<S> RateLimitedScheduler<S> {
    /// Scheduler with explicit limits whose drivers run on `spawner`.
    pub fn with_spawner(limits: RateLimits, spawner: S) -> Self {
        Self::from_parts(DEFAULT_SCHEDULER_NAME.to_string(), limits, spawner, None)
    }

    pub(crate) fn from_parts(
        name: String,
        limits: RateLimits,
        spawner: S,
        audit: Option<Box<dyn AuditSink>>,
    ) -> Self {
        Self {
            gate: Arc::new(Gate {
                name,
                limits,
                window: Mutex::new(AdmissionWindow::with_capacity(limits.capacity())),
                counters: SchedulerCounters::default(),
                next_id: AtomicU64::new(1),
                audit: audit.map(Mutex::new),
            }),
            spawner,
        }
    }

    /// Scheduler name used in logs and audit events.
    pub fn name(&self) -> &str {
        &self.gate.name
    }

    /// Limits this scheduler enforces.
    pub fn limits(&self) -> &RateLimits {
        &self.gate.limits
    }

    /// Admissions currently inside the window.
    pub fn occupancy(&self) -> usize {
        self.gate.occupancy()
    }

    /// Snapshot of counters and current occupancy.
    pub fn stats(&self) -> SchedulerStats {
        self.gate
            .counters
            .snapshot(self.gate.limits.capacity(), self.gate.occupancy())
    }

    /// Cancel a task that has not been admitted yet.
    ///
    /// Returns `true` if this call cancelled the task; `false` if it had already
    /// been admitted or cancelled, in which case nothing happens.
    pub fn cancel(&self, handle: &TaskHandle) -> bool {
        let cancelled = handle.cancel();
        if cancelled {
            tracing::debug!("cancel requested for task {}", handle.id());
        }
        cancelled
    }
}

impl<S: Spawn> RateLimitedScheduler<S> {
    /// Run `action` once the delay has elapsed and the window has room.
    ///
    /// Returns immediately. The action's `Err` or panic is not retried; it is
    /// delivered through [`TaskHandle::join`]. A failed action still consumed
    /// its slot.
    pub fn schedule<F, Fut>(&self, action: F, delay: Duration) -> TaskHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let id = TaskId(self.gate.next_id.fetch_add(1, Ordering::Relaxed));
        let control = Arc::new(TaskControl::new());
        let (tx, rx) = oneshot::channel();

        SchedulerCounters::bump(&self.gate.counters.scheduled);
        self.gate.record_audit(id, AuditAction::Scheduled, None);
        tracing::debug!("task {} scheduled on {} with delay {:?}", id, self.gate.name, delay);

        let gate = Arc::clone(&self.gate);
        let driver_control = Arc::clone(&control);
        self.spawner.spawn(async move {
            let outcome = drive(gate, id, driver_control, delay, action).await;
            // Receiver may be gone if the caller dropped the handle.
            let _ = tx.send(outcome);
        });

        TaskHandle::new(id, control, rx)
    }

    /// Like [`schedule`](Self::schedule) for a synchronous action.
    ///
    /// The closure runs on a runtime worker, so it should be short.
    pub fn schedule_fn<F>(&self, action: F, delay: Duration) -> TaskHandle
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        self.schedule(move || async move { action() }, delay)
    }
}

/// Drive one task from submission to a terminal state.
async fn drive<F, Fut>(
    gate: Arc<Gate>,
    id: TaskId,
    control: Arc<TaskControl>,
    delay: Duration,
    action: F,
) -> Result<(), SchedulerError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    if !delay.is_zero() && !control.wait(delay).await {
        return gate.on_cancelled(id);
    }

    loop {
        match gate.try_admit(&control) {
            Admission::Admitted => break,
            Admission::Cancelled => return gate.on_cancelled(id),
            Admission::Full => {
                SchedulerCounters::bump(&gate.counters.retries);
                tracing::trace!(
                    "task {} waiting: window full, next vacancy in {:?}",
                    id,
                    gate.next_vacancy()
                );
                if !control.wait(gate.limits.retry_interval()).await {
                    return gate.on_cancelled(id);
                }
            }
        }
    }

    SchedulerCounters::bump(&gate.counters.admitted);
    gate.record_audit(id, AuditAction::Admitted, None);
    tracing::debug!("task {} admitted on {}", id, gate.name);

    let outcome = AssertUnwindSafe(async move { action().await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            SchedulerCounters::bump(&gate.counters.completed);
            gate.record_audit(id, AuditAction::Completed, None);
            tracing::debug!("task {} completed", id);
            Ok(())
        }
        Ok(Err(err)) => {
            SchedulerCounters::bump(&gate.counters.failed);
            gate.record_audit(id, AuditAction::Failed, Some(err.to_string()));
            Err(SchedulerError::ActionFailed(err))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            SchedulerCounters::bump(&gate.counters.failed);
            gate.record_audit(id, AuditAction::Failed, Some(message.clone()));
            Err(SchedulerError::ActionPanicked(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
