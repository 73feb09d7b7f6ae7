//! Subscription-side state.

use crate::domain::events::EventRegistry;
use crate::domain::notifier::{EventCallback, Notifier};
use crate::domain::queue::DeliveryQueue;
use crate::domain::records::MessageRecord;
use crate::domain::waitset::{WaitRelay, WaitSignal};
use crate::entities::EventSource;
use std::sync::{Arc, Mutex};
use tracing::debug;
use viaduct_types::{EntityKind, EventKind, InstanceToken, QosProfile};

/// State owned by one subscription: the bounded message queue, the data
/// notifier, the wait relay, and the event surface.
///
/// Dropping the subscription drains the queue and releases every record
/// it still owns.
pub struct SubscriptionState {
    token: InstanceToken,
    key_expr: String,
    qos: QosProfile,
    queue: Mutex<DeliveryQueue<MessageRecord>>,
    notifier: Notifier,
    relay: WaitRelay,
    events: EventRegistry,
}

impl SubscriptionState {
    /// Create the state for a subscription on `key_expr`.
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
            queue: Mutex::new(DeliveryQueue::new()),
            notifier: Notifier::new(),
            relay: WaitRelay::new(),
            events: EventRegistry::new(
                EntityKind::Subscription,
                &[EventKind::RequestedQosIncompatible],
            ),
        }
    }

    /// Key expression the subscription listens on.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    /// The QoS profile the subscription was created with.
    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.qos
    }

    /// Enqueue a delivered message and signal consumers.
    ///
    /// Queue first, then notifier, then relay: whichever signal a
    /// consumer reacts to, the record is already visible.
    pub fn push_message(&self, record: MessageRecord) {
        {
            let mut queue = self
                .queue
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(evicted) = queue.push_bounded(record, self.qos.effective_depth()) {
                debug!(
                    key_expr = %self.key_expr,
                    depth = self.qos.effective_depth(),
                    "message queue depth reached, discarding oldest message"
                );
                drop(evicted);
            }
        }
        self.notifier.record(1);
        self.relay.notify();
    }

    /// Take the oldest queued message, transferring ownership to the
    /// caller. Empty means "checked, nothing new yet".
    pub fn take_message(&self) -> Option<MessageRecord> {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
    }

    /// Whether no messages are queued.
    #[must_use]
    pub fn message_queue_is_empty(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_empty()
    }

    /// Register or clear the new-data listener.
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

impl EventSource for SubscriptionState {
    fn token(&self) -> InstanceToken {
        self.token
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }
}
