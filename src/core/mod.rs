//! Core admission logic, task handles, and scheduler accounting.

pub mod error;
pub mod limits;
pub mod window;
pub mod handle;
pub mod scheduler;
pub mod stats;
pub mod audit;

pub use error::{AppResult, SchedulerError};
pub use limits::{RateLimits, DEFAULT_RETRY_INTERVAL, DEFAULT_WINDOW};
pub use window::AdmissionWindow;
pub use handle::{CancelToken, TaskHandle, TaskId, TaskState};
pub use scheduler::{RateLimitedScheduler, Spawn, DEFAULT_SCHEDULER_NAME};
pub use stats::SchedulerStats;
pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
