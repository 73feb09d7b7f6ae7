//! Per-kind event slots: status queue, listener, and wait condition.

use crate::domain::notifier::{EventCallback, Notifier};
use crate::domain::queue::DeliveryQueue;
use crate::domain::waitset::{WaitRelay, WaitSignal};
use std::sync::{Arc, Mutex};
use tracing::debug;
use viaduct_types::{AdapterError, EntityKind, EventKind, EventStatus};

/// Depth of each per-kind status queue.
pub const EVENT_QUEUE_DEPTH: usize = 10;

struct EventSlot {
    notifier: Notifier,
    statuses: Mutex<DeliveryQueue<EventStatus>>,
    relay: WaitRelay,
}

impl EventSlot {
    fn new() -> Self {
        Self {
            notifier: Notifier::new(),
            statuses: Mutex::new(DeliveryQueue::new()),
            relay: WaitRelay::new(),
        }
    }
}

/// The event surface of one entity.
///
/// Holds one independent slot (notifier + bounded status queue + wait
/// relay) per event kind the entity supports. Slots share a protocol but
/// never interact. Addressing a kind outside the supported set indicates
/// a configuration defect upstream, so it is reported as a caller error,
/// not swallowed.
pub struct EventRegistry {
    entity: EntityKind,
    slots: Vec<(EventKind, EventSlot)>,
}

impl EventRegistry {
    /// Registry for `entity` supporting exactly `supported` kinds.
    #[must_use]
    pub fn new(entity: EntityKind, supported: &[EventKind]) -> Self {
        Self {
            entity,
            slots: supported
                .iter()
                .map(|kind| (*kind, EventSlot::new()))
                .collect(),
        }
    }

    /// Whether `kind` is in this entity's supported set.
    #[must_use]
    pub fn supports(&self, kind: EventKind) -> bool {
        self.slots.iter().any(|(slot_kind, _)| *slot_kind == kind)
    }

    /// Record a status change for `kind`.
    ///
    /// The status enters the kind's bounded queue (oldest discarded on
    /// overflow), then the kind's listener fires (or its unread counter
    /// grows), then its wait condition is signaled: the same queue-first
    /// ordering every delivery follows.
    pub fn record_status(&self, kind: EventKind, status: EventStatus) -> Result<(), AdapterError> {
        let slot = self.slot(kind)?;
        {
            let mut statuses = lock_statuses(&slot.statuses);
            if let Some(evicted) = statuses.push_bounded(status, EVENT_QUEUE_DEPTH) {
                debug!(
                    entity = %self.entity,
                    kind = %kind,
                    depth = EVENT_QUEUE_DEPTH,
                    "event queue depth reached, discarding oldest status"
                );
                drop(evicted);
            }
        }
        slot.notifier.record(1);
        slot.relay.notify();
        Ok(())
    }

    /// Take the oldest queued status for `kind`. Empty is a result, not
    /// an error.
    pub fn take_status(&self, kind: EventKind) -> Result<Option<EventStatus>, AdapterError> {
        let slot = self.slot(kind)?;
        Ok(lock_statuses(&slot.statuses).pop_front())
    }

    /// Whether no statuses are queued for `kind`.
    pub fn status_queue_is_empty(&self, kind: EventKind) -> Result<bool, AdapterError> {
        let slot = self.slot(kind)?;
        Ok(lock_statuses(&slot.statuses).is_empty())
    }

    /// Register or clear the listener for `kind` (flush-on-registration
    /// semantics, see [`Notifier::set_listener`]).
    pub fn set_listener(
        &self,
        kind: EventKind,
        listener: Option<EventCallback>,
    ) -> Result<(), AdapterError> {
        let slot = self.slot(kind)?;
        slot.notifier.set_listener(listener);
        Ok(())
    }

    /// Attach a wait signal to `kind`'s condition slot.
    pub fn attach_condition(
        &self,
        kind: EventKind,
        signal: Arc<WaitSignal>,
    ) -> Result<(), AdapterError> {
        let slot = self.slot(kind)?;
        slot.relay.attach(signal);
        Ok(())
    }

    /// Detach `kind`'s wait signal. Idempotent.
    pub fn detach_condition(&self, kind: EventKind) -> Result<(), AdapterError> {
        let slot = self.slot(kind)?;
        slot.relay.detach();
        Ok(())
    }

    fn slot(&self, kind: EventKind) -> Result<&EventSlot, AdapterError> {
        self.slots
            .iter()
            .find(|(slot_kind, _)| *slot_kind == kind)
            .map(|(_, slot)| slot)
            .ok_or(AdapterError::UnsupportedEvent {
                kind,
                entity: self.entity,
            })
    }
}

fn lock_statuses(
    statuses: &Mutex<DeliveryQueue<EventStatus>>,
) -> std::sync::MutexGuard<'_, DeliveryQueue<EventStatus>> {
    statuses
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
