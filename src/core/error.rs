//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Capacity or a duration was rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Task was cancelled before it was admitted.
    #[error("task cancelled before admission")]
    Cancelled,
    /// Admitted action returned an error.
    #[error("action failed: {0}")]
    ActionFailed(anyhow::Error),
    /// Admitted action panicked.
    #[error("action panicked: {0}")]
    ActionPanicked(String),
    /// Driving task was dropped before it resolved, e.g. on runtime shutdown.
    #[error("task abandoned by the runtime")]
    Abandoned,
}

impl SchedulerError {
    /// True for the configuration variant.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// True if the task never ran because it was cancelled.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
///
/// Scheduled actions return this type; an `Err` is forwarded to the task's
/// handle untouched.
pub type AppResult<T> = Result<T, anyhow::Error>;
