//! Builders to construct rate-limited schedulers.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{RegistryConfig, SchedulerConfig};
use crate::core::{
    AuditSink, RateLimitedScheduler, RateLimits, SchedulerError, DEFAULT_RETRY_INTERVAL,
    DEFAULT_SCHEDULER_NAME, DEFAULT_WINDOW,
};
use crate::runtime::TokioSpawner;

/// Fluent builder for [`RateLimitedScheduler`].
///
/// Values are validated once, in `build`.
pub struct SchedulerBuilder {
    name: String,
    capacity: usize,
    window: Duration,
    retry_interval: Duration,
    audit: Option<Box<dyn AuditSink>>,
}

impl SchedulerBuilder {
    /// Builder admitting `capacity` tasks per window, with default window and retry interval.
    pub fn new(capacity: usize) -> Self {
        Self {
            name: DEFAULT_SCHEDULER_NAME.to_string(),
            capacity,
            window: DEFAULT_WINDOW,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            audit: None,
        }
    }

    /// Builder seeded from configuration.
    pub fn from_config(name: impl Into<String>, cfg: &SchedulerConfig) -> Self {
        Self::new(cfg.capacity)
            .name(name)
            .window(cfg.window())
            .retry_interval(cfg.retry_interval())
    }

    /// Scheduler name used in logs and audit events.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Maximum admissions per window.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Width of the rolling window.
    #[must_use]
    pub const fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Wait between admission re-checks.
    #[must_use]
    pub const fn retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Build a scheduler that spawns onto the ambient tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] for a zero capacity or duration.
    pub fn build(self) -> Result<RateLimitedScheduler<TokioSpawner>, SchedulerError> {
        self.build_with_spawner(TokioSpawner::ambient())
    }

    /// Build a scheduler whose drivers run on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] for a zero capacity or duration.
    pub fn build_with_spawner<S>(self, spawner: S) -> Result<RateLimitedScheduler<S>, SchedulerError> {
        let limits = RateLimits::new(self.capacity, self.window, self.retry_interval)?;
        tracing::debug!(
            "building scheduler {} (capacity={}, window={:?}, retry={:?})",
            self.name,
            limits.capacity(),
            limits.window(),
            limits.retry_interval()
        );
        Ok(RateLimitedScheduler::from_parts(
            self.name,
            limits,
            spawner,
            self.audit,
        ))
    }
}

/// Build one scheduler per entry of the registry configuration.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidConfiguration`] if the registry fails validation.
pub fn build_schedulers<S>(
    cfg: &RegistryConfig,
    spawner: S,
) -> Result<HashMap<String, RateLimitedScheduler<S>>, SchedulerError>
where
    S: Clone,
{
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfiguration(format!("config invalid: {e}")))?;

    let mut schedulers = HashMap::new();
    for (name, scheduler_cfg) in &cfg.schedulers {
        let scheduler =
            SchedulerBuilder::from_config(name.clone(), scheduler_cfg).build_with_spawner(spawner.clone())?;
        schedulers.insert(name.clone(), scheduler);
    }

    Ok(schedulers)
}
