//! Per-entity state: the aggregates tying queue, notifier, relay, and
//! event surface together for subscriptions, publishers, services, and
//! clients.

mod client;
mod publisher;
mod service;
mod subscription;

pub use client::ClientState;
pub use publisher::PublisherState;
pub use service::ServiceState;
pub use subscription::SubscriptionState;

use crate::domain::events::EventRegistry;
use viaduct_types::InstanceToken;

/// Anything carrying an event surface and an instance token.
///
/// Lets the validated entry points in [`crate::ops`] address events on any
/// entity kind uniformly.
pub trait EventSource {
    /// Token of the middleware instance that created the entity.
    fn token(&self) -> InstanceToken;

    /// The entity's event surface.
    fn events(&self) -> &EventRegistry;
}
