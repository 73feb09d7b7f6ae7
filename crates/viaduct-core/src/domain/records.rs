//! Delivered items: the three move-only record types held by queues.
//!
//! Each record owns its transport resource outright. Release happens
//! exactly once, by whichever holder drops the record: the queue on
//! eviction or destruction, the correlation table on teardown, or the
//! caller after a successful take. "Owned versus not-yet-owned" is the
//! type system's problem, not a convention.

use std::fmt;
use viaduct_transport::{SamplePayload, TransportQuery, TransportReply};
use viaduct_types::GlobalId;

/// One message delivered to a subscription.
pub struct MessageRecord {
    payload: SamplePayload,
    recv_timestamp: u64,
    publisher_gid: GlobalId,
}

impl MessageRecord {
    /// Capture a delivered sample, stamping the local receive time.
    #[must_use]
    pub fn new(payload: SamplePayload, recv_timestamp: u64) -> Self {
        let publisher_gid = payload.publisher_gid();
        Self {
            payload,
            recv_timestamp,
            publisher_gid,
        }
    }

    /// The message payload.
    #[must_use]
    pub fn payload(&self) -> &SamplePayload {
        &self.payload
    }

    /// Consume the record, transferring the payload to the caller.
    #[must_use]
    pub fn into_payload(self) -> SamplePayload {
        self.payload
    }

    /// Local receive time, nanoseconds since the unix epoch.
    #[must_use]
    pub fn recv_timestamp(&self) -> u64 {
        self.recv_timestamp
    }

    /// Identity of the publisher that produced the message.
    #[must_use]
    pub fn publisher_gid(&self) -> GlobalId {
        self.publisher_gid
    }
}

impl fmt::Debug for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRecord")
            .field("payload", &self.payload)
            .field("recv_timestamp", &self.recv_timestamp)
            .field("publisher_gid", &self.publisher_gid)
            .finish()
    }
}

/// One inbound request delivered to a service.
///
/// Owns a durable duplicate of the transport query, so it outlives the
/// delivery callback's stack frame. At any moment exactly one place
/// references a given record: the FIFO queue before the application takes
/// the request, or the correlation table while the answer is pending.
#[derive(Debug)]
pub struct QueryRecord {
    query: TransportQuery,
}

impl QueryRecord {
    /// Wrap a durable transport query (callers pass `query.dup()`).
    #[must_use]
    pub fn new(query: TransportQuery) -> Self {
        Self { query }
    }

    /// Sequence number stamped by the sending client.
    #[must_use]
    pub fn sequence_number(&self) -> i64 {
        self.query.sequence_number()
    }

    /// The request payload; its publisher identity is the sending
    /// client's.
    #[must_use]
    pub fn payload(&self) -> &SamplePayload {
        self.query.payload()
    }

    /// Identity of the client that sent the request.
    #[must_use]
    pub fn client_gid(&self) -> GlobalId {
        self.query.payload().publisher_gid()
    }

    /// Answer the request, consuming the record.
    ///
    /// The reply travels back on a transport-owned thread. Consuming here
    /// means a parked request can be answered at most once through this
    /// record.
    pub fn reply(self, reply: TransportReply) {
        self.query.reply(reply);
    }
}

/// One reply delivered to a client.
///
/// Constructed only by the reply adapter, after the transport's validity
/// flag has been checked: an error-flagged reply is dropped before a
/// record ever exists, so holders never re-validate.
pub struct ReplyRecord {
    payload: SamplePayload,
    recv_timestamp: u64,
}

impl ReplyRecord {
    /// Capture a validated reply payload with the local receive time.
    #[must_use]
    pub fn new(payload: SamplePayload, recv_timestamp: u64) -> Self {
        Self {
            payload,
            recv_timestamp,
        }
    }

    /// The reply payload.
    #[must_use]
    pub fn payload(&self) -> &SamplePayload {
        &self.payload
    }

    /// Consume the record, transferring the payload to the caller.
    #[must_use]
    pub fn into_payload(self) -> SamplePayload {
        self.payload
    }

    /// Local receive time, nanoseconds since the unix epoch.
    #[must_use]
    pub fn recv_timestamp(&self) -> u64 {
        self.recv_timestamp
    }
}

impl fmt::Debug for ReplyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyRecord")
            .field("payload", &self.payload)
            .field("recv_timestamp", &self.recv_timestamp)
            .finish()
    }
}
