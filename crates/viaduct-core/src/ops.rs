//! Validated entry points for the application-facing layer.
//!
//! Thin wrappers that check the caller's instance token (and event kind,
//! where relevant) before dispatching into entity state. Every failure is
//! an explicit [`AdapterError`]; nothing here panics or terminates.

use crate::domain::records::{MessageRecord, ReplyRecord};
use crate::domain::notifier::EventCallback;
use crate::entities::{ClientState, EventSource, ServiceState, SubscriptionState};
use tracing::{debug, warn};
use viaduct_transport::{clock, SamplePayload, TransportReply};
use viaduct_types::{AdapterError, EventKind, EventStatus, GlobalId, InstanceToken};

fn check_token(expected: InstanceToken, caller: InstanceToken) -> Result<(), AdapterError> {
    if expected == caller {
        Ok(())
    } else {
        Err(AdapterError::WrongInstance {
            expected,
            actual: caller,
        })
    }
}

/// A request handed to the application: the payload plus what it needs to
/// answer later. The underlying query record is parked in the service's
/// correlation table until [`send_response`] claims it.
#[derive(Debug)]
pub struct TakenRequest {
    /// Sequence number to answer with.
    pub sequence_number: i64,
    /// Identity of the requesting client.
    pub client_gid: GlobalId,
    /// The request payload.
    pub payload: SamplePayload,
}

/// Take the next queued message from a subscription.
pub fn take_message(
    subscription: &SubscriptionState,
    caller: InstanceToken,
) -> Result<Option<MessageRecord>, AdapterError> {
    check_token(subscription.token(), caller)?;
    Ok(subscription.take_message())
}

/// Take the next queued request from a service.
///
/// Moves the query record from the FIFO into the correlation table, keyed
/// by its sequence number, so the eventual [`send_response`] can find it.
/// A duplicate sequence number (transport misbehavior) discards the
/// duplicate and reports [`AdapterError::DuplicateSequence`].
pub fn take_request(
    service: &ServiceState,
    caller: InstanceToken,
) -> Result<Option<TakenRequest>, AdapterError> {
    check_token(service.token(), caller)?;

    let Some(record) = service.take_query() else {
        return Ok(None);
    };

    let taken = TakenRequest {
        sequence_number: record.sequence_number(),
        client_gid: record.client_gid(),
        payload: record.payload().clone(),
    };

    match service.register_pending(taken.sequence_number, record) {
        Ok(()) => Ok(Some(taken)),
        Err(duplicate) => {
            warn!(
                key_expr = service.key_expr(),
                sequence_number = duplicate.sequence_number(),
                "sequence number already pending, discarding duplicate request"
            );
            drop(duplicate);
            Err(AdapterError::DuplicateSequence(taken.sequence_number))
        }
    }
}

/// Answer the request parked under `sequence_number`.
///
/// Returns `true` if a pending request was claimed and the reply sent,
/// `false` if nothing was pending (already answered, or never taken); the
/// two are indistinguishable and neither is an error.
pub fn send_response(
    service: &ServiceState,
    caller: InstanceToken,
    sequence_number: i64,
    bytes: Vec<u8>,
) -> Result<bool, AdapterError> {
    check_token(service.token(), caller)?;

    match service.claim_pending(sequence_number) {
        Some(record) => {
            let payload = SamplePayload::new(bytes, service.gid(), clock::unix_time_nanos());
            record.reply(TransportReply::ok(payload));
            Ok(true)
        }
        None => {
            debug!(
                key_expr = service.key_expr(),
                sequence_number, "no pending request for sequence number"
            );
            Ok(false)
        }
    }
}

/// Take the next queued reply from a client.
pub fn take_response(
    client: &ClientState,
    caller: InstanceToken,
) -> Result<Option<ReplyRecord>, AdapterError> {
    check_token(client.token(), caller)?;
    Ok(client.take_reply())
}

/// Take the next queued event status of `kind` from any entity.
pub fn take_event<E: EventSource>(
    entity: &E,
    caller: InstanceToken,
    kind: EventKind,
) -> Result<Option<EventStatus>, AdapterError> {
    check_token(entity.token(), caller)?;
    entity.events().take_status(kind)
}

/// Register or clear the listener for `kind` on any entity.
pub fn set_event_listener<E: EventSource>(
    entity: &E,
    caller: InstanceToken,
    kind: EventKind,
    listener: Option<EventCallback>,
) -> Result<(), AdapterError> {
    check_token(entity.token(), caller)?;
    entity.events().set_listener(kind, listener)
}
