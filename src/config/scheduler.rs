//! Scheduler configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{RateLimits, SchedulerError};

/// Environment variable holding the capacity.
pub const ENV_CAPACITY: &str = "RATE_GATE_CAPACITY";
/// Environment variable holding the window width in milliseconds.
pub const ENV_WINDOW_MS: &str = "RATE_GATE_WINDOW_MS";
/// Environment variable holding the retry interval in milliseconds.
pub const ENV_RETRY_INTERVAL_MS: &str = "RATE_GATE_RETRY_INTERVAL_MS";

const fn default_window_ms() -> u64 {
    1000
}

const fn default_retry_interval_ms() -> u64 {
    10
}

/// Configuration of a single scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum admissions per window.
    pub capacity: usize,
    /// Window width in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Wait between admission re-checks in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

/// Named schedulers, e.g. one per upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Map of scheduler name to configuration.
    pub schedulers: HashMap<String, SchedulerConfig>,
}

impl SchedulerConfig {
    /// Configuration with the default window and retry interval.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            window_ms: default_window_ms(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.window_ms == 0 {
            return Err("window_ms must be greater than 0".into());
        }
        if self.retry_interval_ms == 0 {
            return Err("retry_interval_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, after loading `.env` if present.
    ///
    /// `RATE_GATE_CAPACITY` is required; the window and retry interval fall
    /// back to their defaults.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = parse_var(&lookup, ENV_CAPACITY)?
            .ok_or_else(|| format!("{ENV_CAPACITY} is not set"))?;
        let cfg = Self {
            capacity: usize::try_from(capacity)
                .map_err(|_| format!("{ENV_CAPACITY} is out of range"))?,
            window_ms: parse_var(&lookup, ENV_WINDOW_MS)?.unwrap_or_else(default_window_ms),
            retry_interval_ms: parse_var(&lookup, ENV_RETRY_INTERVAL_MS)?
                .unwrap_or_else(default_retry_interval_ms),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Window width as a `Duration`.
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Retry interval as a `Duration`.
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl TryFrom<&SchedulerConfig> for RateLimits {
    type Error = SchedulerError;

    fn try_from(cfg: &SchedulerConfig) -> Result<Self, Self::Error> {
        Self::new(cfg.capacity, cfg.window(), cfg.retry_interval())
    }
}

impl RegistryConfig {
    /// Validate all schedulers and ensure at least one exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.schedulers.is_empty() {
            return Err("at least one scheduler must be defined".into());
        }
        for (name, scheduler) in &self.schedulers {
            scheduler
                .validate()
                .map_err(|e| format!("scheduler `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse registry configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<u64>, String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| format!("{key} must be a non-negative integer: {e}"))
        })
        .transpose()
}
