//! The three entry points the transport invokes on its delivery threads.
//!
//! Each follows the same shape: upgrade the weak entity reference (a
//! failed upgrade means the entity is gone or the transport misbehaved,
//! so the delivery is logged and dropped), construct the delivered record
//! taking ownership of the transport resource, then push it through the
//! entity (queue first, notifier, relay).

use crate::domain::records::{MessageRecord, QueryRecord, ReplyRecord};
use crate::entities::{ClientState, ServiceState, SubscriptionState};
use std::sync::Weak;
use tracing::{error, warn};
use viaduct_transport::{clock, SamplePayload, TransportQuery, TransportReply};

/// Deliver a published sample to a subscription.
pub fn message_handler(subscription: &Weak<SubscriptionState>, sample: SamplePayload) {
    let Some(subscription) = subscription.upgrade() else {
        error!("subscription state unavailable, dropping sample");
        return;
    };

    let record = MessageRecord::new(sample, clock::unix_time_nanos());
    subscription.push_message(record);
}

/// Deliver an inbound query to a service.
///
/// Takes a durable duplicate of the transport query so the record can
/// outlive this callback's stack frame.
pub fn query_handler(service: &Weak<ServiceState>, query: &TransportQuery) {
    let Some(service) = service.upgrade() else {
        error!(
            key_expr = query.key_expr(),
            "service state unavailable, dropping query"
        );
        return;
    };

    service.push_query(QueryRecord::new(query.dup()));
}

/// Deliver an inbound reply to a client.
///
/// The reply arrives by value: ownership transfers here, and the
/// transport retains nothing to double-release. Error-flagged replies are
/// logged and dropped; they never surface as queue items.
pub fn reply_handler(client: &Weak<ClientState>, reply: TransportReply) {
    let Some(client) = client.upgrade() else {
        error!("client state unavailable, dropping reply");
        return;
    };

    if let Some(message) = reply.error_message() {
        warn!(
            key_expr = client.key_expr(),
            error = message,
            "discarding error-flagged reply"
        );
        return;
    }

    let Some(payload) = reply.into_payload() else {
        // Valid flag with no payload cannot be constructed.
        return;
    };
    client.push_reply(ReplyRecord::new(payload, clock::unix_time_nanos()));
}
