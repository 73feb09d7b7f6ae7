//! Wall-clock timestamps stamped on samples.

use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the unix epoch.
///
/// Returns 0 if the system clock is before the epoch rather than failing;
/// timestamps are informational and must never abort a delivery.
#[must_use]
pub fn unix_time_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
