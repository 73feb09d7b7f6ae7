//! # Viaduct Core
//!
//! The queuing, correlation, and notification subsystem shared by
//! subscriptions, services, and clients: bounded delivery queues with
//! drop-oldest eviction, the listener/unread-counter notifier state
//! machine, wait-condition relays, the service-side query correlation
//! table, the client-side sequence generator, and the transport-callback
//! adapters that feed them.
//!
//! ## Execution model
//!
//! Transport-owned threads push deliveries in through
//! [`adapters::callbacks`]; consumer threads pull them out through the
//! entity state in [`entities`] or the validated entry points in [`ops`].
//! Every delivery follows the same shape: queue insertion first, then the
//! notifier, then the wait relay, so any consumer woken by either signal
//! finds the item already visible in the queue.
//!
//! Serialization is per entity instance: one mutex per queue, notifier,
//! relay slot, and correlation table. Operations on different entities
//! never contend. Registered listener callbacks are invoked *outside* the
//! notifier's critical section; a callback must not re-enter the same
//! entity's API synchronously.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod entities;
pub mod ops;

// Re-export main types
pub use domain::correlation::CorrelationTable;
pub use domain::events::{EventRegistry, EVENT_QUEUE_DEPTH};
pub use domain::notifier::{EventCallback, Notifier};
pub use domain::queue::DeliveryQueue;
pub use domain::records::{MessageRecord, QueryRecord, ReplyRecord};
pub use domain::sequence::SequenceGenerator;
pub use domain::waitset::{WaitRelay, WaitSignal};
pub use entities::{ClientState, EventSource, PublisherState, ServiceState, SubscriptionState};
pub use ops::TakenRequest;
