//! Per-client sequence number generator.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing counter stamped on outgoing requests.
///
/// The first value is 0. Values are unique across concurrent callers: the
/// counter is a single atomic fetch-and-add, so no two calls can observe
/// the same value. Wrap-around at `u64::MAX` is accepted and not defended
/// against.
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    /// A generator whose first value is 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Reserve and return the next sequence number.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
