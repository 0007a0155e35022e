//! Audit sink implementations.
//!
//! A scheduler with an attached sink records one event per lifecycle step of
//! every task. Retries are not audited; see [`SchedulerStats`](crate::core::SchedulerStats).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::TaskId;
use crate::util::clock::now_ms;

/// Lifecycle step recorded in an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// `schedule` accepted the task.
    Scheduled,
    /// Task won a slot in the window.
    Admitted,
    /// Task was cancelled before admission.
    Cancelled,
    /// Admitted action returned `Ok`.
    Completed,
    /// Admitted action returned an error or panicked.
    Failed,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related task identifier.
    pub task_id: TaskId,
    /// Name of the scheduler that owns the task.
    pub scheduler: String,
    /// Lifecycle step.
    pub action: AuditAction,
    /// Wall-clock timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Shared sink, so the caller can keep reading what the scheduler records.
impl<T: AuditSink + ?Sized> AuditSink for Arc<Mutex<T>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event stamped with a fresh id and the current time.
pub fn build_audit_event(
    task_id: TaskId,
    scheduler: impl Into<String>,
    action: AuditAction,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: Uuid::new_v4().to_string(),
        task_id,
        scheduler: scheduler.into(),
        action,
        created_at_ms: now_ms(),
        detail,
    }
}
