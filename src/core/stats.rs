//! Scheduler counters and snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Configured admissions per window.
    pub capacity: usize,
    /// Admissions currently inside the window.
    pub occupancy: usize,
    /// Total `schedule` calls.
    pub scheduled: u64,
    /// Tasks admitted.
    pub admitted: u64,
    /// Admission checks that found the window full.
    pub retries: u64,
    /// Tasks cancelled before admission.
    pub cancelled: u64,
    /// Admitted actions that finished with `Ok`.
    pub completed: u64,
    /// Admitted actions that returned an error or panicked.
    pub failed: u64,
}

/// Internal counters (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub scheduled: AtomicU64,
    pub admitted: AtomicU64,
    pub retries: AtomicU64,
    pub cancelled: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
}

impl SchedulerCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, capacity: usize, occupancy: usize) -> SchedulerStats {
        SchedulerStats {
            capacity,
            occupancy,
            scheduled: self.scheduled.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
