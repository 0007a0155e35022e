//! Configuration models for schedulers.

pub mod scheduler;

pub use scheduler::{RegistryConfig, SchedulerConfig, ENV_CAPACITY, ENV_RETRY_INTERVAL_MS, ENV_WINDOW_MS};
