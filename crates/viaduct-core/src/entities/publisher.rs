//! Publisher-side state.

use crate::domain::events::EventRegistry;
use crate::entities::EventSource;
use viaduct_types::{EntityKind, EventKind, GlobalId, InstanceToken, QosProfile};

/// State owned by one publisher.
///
/// Publishers have no delivery queue (outbound samples go straight to
/// the transport) but carry the event surface for the offered-QoS
/// incompatibility kind.
pub struct PublisherState {
    token: InstanceToken,
    key_expr: String,
    qos: QosProfile,
    gid: GlobalId,
    events: EventRegistry,
}

impl PublisherState {
    /// Create the state for a publisher on `key_expr` with the identity
    /// it publishes under.
    #[must_use]
    pub fn new(
        token: InstanceToken,
        key_expr: impl Into<String>,
        qos: QosProfile,
        gid: GlobalId,
    ) -> Self {
        Self {
            token,
            key_expr: key_expr.into(),
            qos,
            gid,
            events: EventRegistry::new(EntityKind::Publisher, &[EventKind::OfferedQosIncompatible]),
        }
    }

    /// Key expression published to.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    /// The QoS profile the publisher was created with.
    #[must_use]
    pub fn qos(&self) -> &QosProfile {
        &self.qos
    }

    /// Identity stamped on published samples.
    #[must_use]
    pub fn gid(&self) -> GlobalId {
        self.gid
    }
}

impl EventSource for PublisherState {
    fn token(&self) -> InstanceToken {
        self.token
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }
}
