//! # Rate Gate
//!
//! A sliding-window, rate-limited task scheduler.
//!
//! Callers hand the scheduler units of deferred work. Each one waits for its
//! requested delay and is then admitted only if fewer than `capacity`
//! admissions were recorded inside the trailing window (1 second by default).
//! A task that finds the window full re-checks every retry interval (10ms by
//! default) until it is admitted or cancelled.
//!
//! ## Key Features
//!
//! - **Sliding-window admission**: at most `N` admissions in any trailing window,
//!   shared across every clone of a scheduler
//! - **Non-blocking**: delays and retries are tokio timers, never busy waits
//! - **Cancellation**: `cancel` races admission deterministically; a cancelled
//!   task's timer is woken and dropped
//! - **Failure forwarding**: action errors and panics reach the caller through
//!   [`TaskHandle::join`](core::TaskHandle::join), never retried or swallowed
//! - **Configuration**: JSON or environment (`.env`) via [`config`], named
//!   schedulers via [`builders::build_schedulers`]
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use rate_gate::builders::SchedulerBuilder;
//!
//! # async fn demo() -> Result<(), rate_gate::core::SchedulerError> {
//! let scheduler = SchedulerBuilder::new(2)
//!     .name("search-api")
//!     .window(Duration::from_secs(1))
//!     .build()?;
//!
//! let handle = scheduler.schedule(
//!     || async {
//!         // call the upstream API
//!         Ok(())
//!     },
//!     Duration::from_millis(50),
//! );
//!
//! // Give up if it has not been admitted within 5 seconds.
//! let token = handle.cancel_token();
//! match tokio::time::timeout(Duration::from_secs(5), handle.join()).await {
//!     Ok(outcome) => outcome?,
//!     Err(_) => {
//!         token.cancel();
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission logic, task handles, and accounting.
pub mod core;
/// Configuration models for schedulers.
pub mod config;
/// Builders to construct schedulers from code or configuration.
pub mod builders;
/// Runtime adapters that drive scheduled tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;
