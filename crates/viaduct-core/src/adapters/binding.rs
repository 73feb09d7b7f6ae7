//! Wiring entities to the in-memory transport.
//!
//! Each binding hands the transport a closure over a weak entity
//! reference, so a destroyed entity never blocks transport teardown and a
//! late delivery degrades to a logged drop inside the callback.

use crate::adapters::callbacks;
use crate::entities::{ClientState, ServiceState, SubscriptionState};
use std::sync::Arc;
use viaduct_transport::{
    clock, InMemoryTransport, QueryableHandle, SamplePayload, SubscriberHandle,
};

/// Register a subscription's message adapter with the transport.
///
/// The returned handle keeps the registration alive; drop it to
/// undeclare.
#[must_use]
pub fn bind_subscription(
    transport: &InMemoryTransport,
    subscription: &Arc<SubscriptionState>,
) -> SubscriberHandle {
    let weak = Arc::downgrade(subscription);
    transport.declare_subscriber(
        subscription.key_expr().to_string(),
        Arc::new(move |sample| callbacks::message_handler(&weak, sample)),
    )
}

/// Register a service's query adapter with the transport.
#[must_use]
pub fn bind_service(
    transport: &InMemoryTransport,
    service: &Arc<ServiceState>,
) -> QueryableHandle {
    let weak = Arc::downgrade(service);
    transport.declare_queryable(
        service.key_expr().to_string(),
        Arc::new(move |query| callbacks::query_handler(&weak, query)),
    )
}

/// Send a request from `client`, stamping the next sequence number.
///
/// The reply, valid or error-flagged, comes back through the client's
/// reply adapter on a transport thread. Returns the sequence number the
/// request was stamped with.
pub fn send_request(
    transport: &InMemoryTransport,
    client: &Arc<ClientState>,
    bytes: Vec<u8>,
) -> u64 {
    let sequence_number = client.next_sequence_number();
    let payload = SamplePayload::new(bytes, client.gid(), clock::unix_time_nanos());
    let weak = Arc::downgrade(client);
    transport.query(
        client.key_expr().to_string(),
        payload,
        sequence_number as i64,
        Box::new(move |reply| callbacks::reply_handler(&weak, reply)),
    );
    sequence_number
}
