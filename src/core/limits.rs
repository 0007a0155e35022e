//! Validated admission limits.

use std::time::Duration;

use serde::Serialize;

use crate::core::SchedulerError;

/// Default width of the rolling admission window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);
/// Default wait between admission re-checks while the window is full.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Throughput ceiling enforced by a scheduler.
///
/// At most `capacity` admissions fall inside any trailing `window`. A task that
/// finds the window full re-checks every `retry_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimits {
    capacity: usize,
    window: Duration,
    retry_interval: Duration,
}

impl RateLimits {
    /// Build limits, rejecting a zero capacity or zero durations.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if `capacity < 1` or
    /// either duration is zero.
    pub fn new(
        capacity: usize,
        window: Duration,
        retry_interval: Duration,
    ) -> Result<Self, SchedulerError> {
        if capacity == 0 {
            return Err(SchedulerError::InvalidConfiguration(
                "capacity must be greater than 0".into(),
            ));
        }
        if window.is_zero() {
            return Err(SchedulerError::InvalidConfiguration(
                "window must be a positive duration".into(),
            ));
        }
        if retry_interval.is_zero() {
            return Err(SchedulerError::InvalidConfiguration(
                "retry_interval must be a positive duration".into(),
            ));
        }
        Ok(Self {
            capacity,
            window,
            retry_interval,
        })
    }

    /// Limits with the default window (1s) and retry interval (10ms).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if `capacity < 1`.
    pub fn per_second(capacity: usize) -> Result<Self, SchedulerError> {
        Self::new(capacity, DEFAULT_WINDOW, DEFAULT_RETRY_INTERVAL)
    }

    /// Maximum admissions per window.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Width of the rolling window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Wait between admission re-checks.
    pub const fn retry_interval(&self) -> Duration {
        self.retry_interval
    }
}
