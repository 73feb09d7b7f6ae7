//! Wait primitive and the per-entity relay that signals it.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Owner-supplied wait primitive: a flag guarded by a mutex plus a
/// condition variable.
///
/// One signal is typically shared across every entity a caller is waiting
/// on; the caller blocks in [`WaitSignal::wait_timeout`] and re-checks its
/// queues on wakeup. Signals are level-triggered: a notification arriving
/// before the wait starts is not lost.
pub struct WaitSignal {
    triggered: Mutex<bool>,
    condvar: Condvar,
}

impl WaitSignal {
    /// An untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            triggered: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Wake every thread blocked on the signal.
    pub fn notify(&self) {
        let mut triggered = self
            .triggered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *triggered = true;
        drop(triggered);
        self.condvar.notify_all();
    }

    /// Block until the signal fires or `timeout` elapses.
    ///
    /// Returns `true` if the signal fired, consuming the trigger so the
    /// next wait blocks again.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let triggered = self
            .triggered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (mut triggered, _result) = self
            .condvar
            .wait_timeout_while(triggered, timeout, |fired| !*fired)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let fired = *triggered;
        *triggered = false;
        fired
    }
}

impl Default for WaitSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-entity slot holding at most one attached [`WaitSignal`].
///
/// The relay does not own the signal's lifecycle; the waiting caller
/// attaches it before blocking and detaches it after. `notify` on an empty
/// slot is a no-op; attach, detach, and notify are serialized against each
/// other so a signal can never be woken while being swapped out.
pub struct WaitRelay {
    attached: Mutex<Option<Arc<WaitSignal>>>,
}

impl WaitRelay {
    /// An empty relay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attached: Mutex::new(None),
        }
    }

    /// Attach a signal, replacing any previous one.
    pub fn attach(&self, signal: Arc<WaitSignal>) {
        *self.lock_slot() = Some(signal);
    }

    /// Clear the slot. Idempotent.
    pub fn detach(&self) {
        *self.lock_slot() = None;
    }

    /// Wake the attached signal, if any.
    pub fn notify(&self) {
        let attached = self.lock_slot();
        if let Some(signal) = attached.as_ref() {
            signal.notify();
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<WaitSignal>>> {
        self.attached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for WaitRelay {
    fn default() -> Self {
        Self::new()
    }
}
