//! Client-side state.

use crate::domain::events::EventRegistry;
use crate::domain::notifier::{EventCallback, Notifier};
use crate::domain::queue::DeliveryQueue;
use crate::domain::records::ReplyRecord;
use crate::domain::sequence::SequenceGenerator;
use crate::domain::waitset::{WaitRelay, WaitSignal};
use crate::entities::EventSource;
use std::sync::{Arc, Mutex};
use tracing::debug;
use viaduct_types::{EntityKind, GlobalId, InstanceToken, QosProfile};

/// State owned by one client: the inbound reply queue, the sequence
/// generator stamped onto outgoing requests, the data notifier, the wait
/// relay, and an (empty) event surface.
pub struct ClientState {
    token: InstanceToken,
    key_expr: String,
    qos: QosProfile,
    gid: GlobalId,
    queue: Mutex<DeliveryQueue<ReplyRecord>>,
    sequence: SequenceGenerator,
    notifier: Notifier,
    relay: WaitRelay,
    events: EventRegistry,
}

impl ClientState {
    /// Create the state for a client of the service on `key_expr`.
    #[must_use]
    pub fn new(token: InstanceToken, key_expr: impl Into<String>, qos: QosProfile) -> Self {
        let key_expr = key_expr.into();
        if qos.depth == 0 {
            debug!(key_expr = %key_expr, "configured queue depth 0 clamped to 1");
        }
        Self {
            token,
            key_expr,
            qos,
            gid: GlobalId::generate(),
            queue: Mutex::new(DeliveryQueue::new()),
            sequence: SequenceGenerator::new(),
            notifier: Notifier::new(),
            relay: WaitRelay::new(),
            // No event kind maps to clients; every request errors.
            events: EventRegistry::new(EntityKind::Client, &[]),
        }
    }

    /// Key expression of the service this client talks to.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    /// The QoS profile the client was created with.
    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.qos
    }

    /// Identity stamped on outgoing requests.
    #[must_use]
    pub fn gid(&self) -> GlobalId {
        self.gid
    }

    /// Reserve the sequence number for the next outgoing request.
    /// Strictly increasing, first value 0, unique across racing senders.
    pub fn next_sequence_number(&self) -> u64 {
        self.sequence.next()
    }

    /// Enqueue a delivered reply and signal consumers. Queue first, then
    /// notifier, then relay.
    pub fn push_reply(&self, record: ReplyRecord) {
        {
            let mut queue = self
                .queue
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(evicted) = queue.push_bounded(record, self.qos.effective_depth()) {
                debug!(
                    key_expr = %self.key_expr,
                    depth = self.qos.effective_depth(),
                    "reply queue depth reached, discarding oldest reply"
                );
                drop(evicted);
            }
        }
        self.notifier.record(1);
        self.relay.notify();
    }

    /// Take the oldest queued reply, transferring ownership to the
    /// caller.
    pub fn take_reply(&self) -> Option<ReplyRecord> {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
    }

    /// Whether no replies are queued.
    #[must_use]
    pub fn reply_queue_is_empty(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_empty()
    }

    /// Register or clear the new-reply listener.
    pub fn set_data_listener(&self, listener: Option<EventCallback>) {
        self.notifier.set_listener(listener);
    }

    /// Attach the wait signal consumers block on.
    pub fn attach_condition(&self, signal: Arc<WaitSignal>) {
        self.relay.attach(signal);
    }

    /// Detach the wait signal. Idempotent.
    pub fn detach_condition(&self) {
        self.relay.detach();
    }
}

impl EventSource for ClientState {
    fn token(&self) -> InstanceToken {
        self.token
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }
}
