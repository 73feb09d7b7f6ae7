//! Listener dispatch state machine.
//!
//! Each entity owns one notifier for its "new data" events (and one per
//! supported event kind through the registry). The notifier is a small
//! state machine: while no listener is registered, events accumulate in an
//! unread counter; registering a listener flushes the accumulated count to
//! it exactly once, and from then on every event invokes the listener
//! directly with the counter pinned at zero.

use std::sync::{Arc, Mutex};

/// Listener invoked with the number of events it is being told about.
///
/// The closure captures whatever context the application needs. It runs on
/// the thread that recorded the event (usually a transport delivery
/// thread) and must not re-enter the owning entity's API synchronously.
pub type EventCallback = Arc<dyn Fn(usize) + Send + Sync>;

enum ListenerState {
    /// No listener registered; events accumulate.
    NoListener { unread: usize },
    /// Listener registered; events dispatch directly.
    Listening { callback: EventCallback },
}

/// Per-entity listener slot with flush-on-registration semantics.
pub struct Notifier {
    state: Mutex<ListenerState>,
}

impl Notifier {
    /// A notifier in its initial state: no listener, zero unread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ListenerState::NoListener { unread: 0 }),
        }
    }

    /// Record `count` new events.
    ///
    /// With a listener registered the callback fires synchronously with
    /// `count`; otherwise the unread counter grows by `count`. The
    /// callback runs outside the notifier's critical section.
    pub fn record(&self, count: usize) {
        let callback = {
            let mut state = self.lock_state();
            match &mut *state {
                ListenerState::Listening { callback } => Some(Arc::clone(callback)),
                ListenerState::NoListener { unread } => {
                    *unread += count;
                    None
                }
            }
        };

        if let Some(callback) = callback {
            callback(count);
        }
    }

    /// Register or clear the listener.
    ///
    /// Registering while events are unread flushes the accumulated count
    /// to the new listener exactly once and resets the counter. Clearing
    /// returns to accumulation with the counter at zero.
    pub fn set_listener(&self, listener: Option<EventCallback>) {
        let flush = {
            let mut state = self.lock_state();
            match listener {
                Some(callback) => {
                    let pending = match *state {
                        ListenerState::NoListener { unread } => unread,
                        ListenerState::Listening { .. } => 0,
                    };
                    *state = ListenerState::Listening {
                        callback: Arc::clone(&callback),
                    };
                    (pending > 0).then_some((callback, pending))
                }
                None => {
                    // Clearing from Listening lands on a zero counter (it
                    // was pinned at zero while listening). Clearing while
                    // already accumulating leaves the counter untouched.
                    if matches!(*state, ListenerState::Listening { .. }) {
                        *state = ListenerState::NoListener { unread: 0 };
                    }
                    None
                }
            }
        };

        if let Some((callback, pending)) = flush {
            callback(pending);
        }
    }

    /// Events recorded while no listener was registered. Zero whenever a
    /// listener is set.
    #[must_use]
    pub fn unread(&self) -> usize {
        match &*self.lock_state() {
            ListenerState::NoListener { unread } => *unread,
            ListenerState::Listening { .. } => 0,
        }
    }

    /// Whether a listener is currently registered.
    #[must_use]
    pub fn has_listener(&self) -> bool {
        matches!(&*self.lock_state(), ListenerState::Listening { .. })
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ListenerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
