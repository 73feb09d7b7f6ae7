//! Service-side state.

use crate::domain::correlation::CorrelationTable;
use crate::domain::events::EventRegistry;
use crate::domain::notifier::{EventCallback, Notifier};
use crate::domain::queue::DeliveryQueue;
use crate::domain::records::QueryRecord;
use crate::domain::waitset::{WaitRelay, WaitSignal};
use crate::entities::EventSource;
use std::sync::{Arc, Mutex};
use tracing::debug;
use viaduct_types::{EntityKind, GlobalId, InstanceToken, QosProfile};

/// State owned by one service: the inbound query FIFO, the correlation
/// table parking requests awaiting an answer, the data notifier, the wait
/// relay, and an (empty) event surface.
///
/// A query record lives in exactly one place at a time: the FIFO until
/// the application takes the request, then the correlation table until
/// the response is sent.
pub struct ServiceState {
    token: InstanceToken,
    key_expr: String,
    qos: QosProfile,
    gid: GlobalId,
    queue: Mutex<DeliveryQueue<QueryRecord>>,
    pending: CorrelationTable,
    notifier: Notifier,
    relay: WaitRelay,
    events: EventRegistry,
}

impl ServiceState {
    /// Create the state for a service on `key_expr`.
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
            pending: CorrelationTable::new(),
            notifier: Notifier::new(),
            relay: WaitRelay::new(),
            // No event kind maps to services; every request errors.
            events: EventRegistry::new(EntityKind::Service, &[]),
        }
    }

    /// Key expression the service answers on.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    /// The QoS profile the service was created with.
    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.qos
    }

    /// Identity stamped on outgoing replies.
    #[must_use]
    pub fn gid(&self) -> GlobalId {
        self.gid
    }

    /// Enqueue a delivered query and signal consumers. Queue first, then
    /// notifier, then relay.
    pub fn push_query(&self, record: QueryRecord) {
        {
            let mut queue = self
                .queue
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(evicted) = queue.push_bounded(record, self.qos.effective_depth()) {
                debug!(
                    key_expr = %self.key_expr,
                    depth = self.qos.effective_depth(),
                    sequence_number = evicted.sequence_number(),
                    "query queue depth reached, discarding oldest query"
                );
                drop(evicted);
            }
        }
        self.notifier.record(1);
        self.relay.notify();
    }

    /// Take the oldest queued query, transferring ownership to the
    /// caller.
    pub fn take_query(&self) -> Option<QueryRecord> {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
    }

    /// Whether no queries are queued.
    #[must_use]
    pub fn query_queue_is_empty(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_empty()
    }

    /// Park a taken query until its answer is sent. On a duplicate
    /// sequence number the table is untouched and the record comes back.
    pub fn register_pending(
        &self,
        sequence_number: i64,
        query: QueryRecord,
    ) -> Result<(), QueryRecord> {
        self.pending.register(sequence_number, query)
    }

    /// Detach the parked query for `sequence_number`, if any.
    pub fn claim_pending(&self, sequence_number: i64) -> Option<QueryRecord> {
        self.pending.claim(sequence_number)
    }

    /// Number of requests awaiting an answer.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Register or clear the new-request listener.
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

impl EventSource for ServiceState {
    fn token(&self) -> InstanceToken {
        self.token
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }
}
