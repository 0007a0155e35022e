//! Rolling record of admission timestamps.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Ordered timestamps of admissions inside the trailing window.
///
/// Entries are appended in non-decreasing order and only ever removed from the
/// front. Stale entries are dropped lazily by [`AdmissionWindow::prune`], which
/// callers run before every capacity check.
#[derive(Debug, Default, Clone)]
pub struct AdmissionWindow {
    entries: VecDeque<Instant>,
}

impl AdmissionWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty window with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Drop entries older than `width` relative to `now`. Returns how many were removed.
    ///
    /// An entry exactly `width` old is still inside the window.
    pub fn prune(&mut self, now: Instant, width: Duration) -> usize {
        let mut removed = 0;
        while let Some(&oldest) = self.entries.front() {
            if now.saturating_duration_since(oldest) > width {
                self.entries.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// Prune, then report whether another admission fits under `capacity`.
    pub fn has_room(&mut self, now: Instant, width: Duration, capacity: usize) -> bool {
        self.prune(now, width);
        self.entries.len() < capacity
    }

    /// Append an admission at `now`.
    ///
    /// Callers read `now` while holding exclusive access, so it is never
    /// earlier than the newest entry.
    pub fn record(&mut self, now: Instant) {
        debug_assert!(
            self.entries.back().is_none_or(|&newest| newest <= now),
            "admission recorded out of order"
        );
        self.entries.push_back(now);
    }

    /// Number of entries currently held (stale ones included until the next prune).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no admissions are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest recorded admission.
    pub fn oldest(&self) -> Option<Instant> {
        self.entries.front().copied()
    }

    /// How long until the oldest entry ages out, if the window is at `capacity`.
    ///
    /// Returns `None` when there is room right now.
    pub fn time_until_vacancy(
        &mut self,
        now: Instant,
        width: Duration,
        capacity: usize,
    ) -> Option<Duration> {
        if self.has_room(now, width, capacity) {
            return None;
        }
        let oldest = self.oldest()?;
        let age = now.saturating_duration_since(oldest);
        Some(width.saturating_sub(age) + Duration::from_nanos(1))
    }

    /// Iterate recorded timestamps, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.entries.iter()
    }
}
