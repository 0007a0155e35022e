//! Wall-clock helpers.
//!
//! Admission decisions use the monotonic `tokio::time::Instant`; wall-clock
//! time only stamps audit events.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
