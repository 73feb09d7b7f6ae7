//! Opaque, ownership-tracked handles crossing the transport boundary.

use crate::session::WorkerHandle;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::warn;
use viaduct_types::GlobalId;

/// A reference-counted payload with origin identity and source timestamp.
///
/// Cloning increments the refcount; the underlying bytes are released when
/// the last handle drops. The queuing subsystem treats the contents as
/// opaque.
#[derive(Clone)]
pub struct SamplePayload {
    bytes: Arc<[u8]>,
    publisher_gid: GlobalId,
    source_timestamp: u64,
}

impl SamplePayload {
    /// Wrap owned bytes in a fresh handle.
    #[must_use]
    pub fn new(bytes: Vec<u8>, publisher_gid: GlobalId, source_timestamp: u64) -> Self {
        Self {
            bytes: bytes.into(),
            publisher_gid,
            source_timestamp,
        }
    }

    /// Build a handle sharing already-counted bytes (one increment per
    /// matched subscriber, never a deep copy).
    pub(crate) fn from_shared(
        bytes: Arc<[u8]>,
        publisher_gid: GlobalId,
        source_timestamp: u64,
    ) -> Self {
        Self {
            bytes,
            publisher_gid,
            source_timestamp,
        }
    }

    /// The raw payload bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Identity of the entity that produced the payload.
    #[must_use]
    pub fn publisher_gid(&self) -> GlobalId {
        self.publisher_gid
    }

    /// Transport-side timestamp, nanoseconds since the unix epoch.
    #[must_use]
    pub fn source_timestamp(&self) -> u64 {
        self.source_timestamp
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of live handles sharing these bytes. Diagnostic surface;
    /// release-accounting tests lean on it.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }
}

impl fmt::Debug for SamplePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplePayload")
            .field("len", &self.bytes.len())
            .field("publisher_gid", &self.publisher_gid)
            .field("source_timestamp", &self.source_timestamp)
            .finish()
    }
}

/// One-shot reply path back to the requesting client.
pub(crate) struct PendingReply {
    pub(crate) callback: crate::session::ReplyCallback,
    pub(crate) worker: WorkerHandle,
}

struct QueryInner {
    key_expr: String,
    sequence_number: i64,
    payload: SamplePayload,
    pending: Mutex<Option<PendingReply>>,
}

/// An inbound request handle.
///
/// The handle delivered to a queryable callback borrows the transport's
/// stack frame conceptually; [`TransportQuery::dup`] takes a durable
/// reference-counted copy so the request can be queued and answered long
/// after the callback returned. All duplicates share the one-shot reply
/// slot: whichever holder replies first wins, later replies are dropped
/// with a warning.
pub struct TransportQuery {
    inner: Arc<QueryInner>,
}

impl TransportQuery {
    pub(crate) fn new(
        key_expr: String,
        sequence_number: i64,
        payload: SamplePayload,
        callback: crate::session::ReplyCallback,
        worker: WorkerHandle,
    ) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                key_expr,
                sequence_number,
                payload,
                pending: Mutex::new(Some(PendingReply { callback, worker })),
            }),
        }
    }

    /// Take a durable duplicate of the request.
    #[must_use]
    pub fn dup(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Key expression the request was sent to.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.inner.key_expr
    }

    /// Sequence number stamped on the request by the sending client.
    #[must_use]
    pub fn sequence_number(&self) -> i64 {
        self.inner.sequence_number
    }

    /// The request payload. The payload's publisher identity is the
    /// sending client's.
    #[must_use]
    pub fn payload(&self) -> &SamplePayload {
        &self.inner.payload
    }

    /// Send the reply back to the requesting client.
    ///
    /// The reply is delivered on a transport-owned thread. The path is
    /// one-shot: a second reply for the same request is logged and
    /// dropped.
    pub fn reply(&self, reply: TransportReply) {
        let pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();

        match pending {
            Some(PendingReply { callback, worker }) => {
                worker.schedule(Box::new(move || callback(reply)));
            }
            None => {
                warn!(
                    key_expr = %self.inner.key_expr,
                    sequence_number = self.inner.sequence_number,
                    "request already answered, dropping extra reply"
                );
            }
        }
    }
}

impl fmt::Debug for TransportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportQuery")
            .field("key_expr", &self.inner.key_expr)
            .field("sequence_number", &self.inner.sequence_number)
            .field("payload", &self.inner.payload)
            .finish()
    }
}

/// An inbound reply handle, owned by value.
///
/// The transport hands the reply over by move, so once a delivery callback
/// has it nothing else can release it; a double release cannot be
/// expressed.
#[derive(Debug)]
pub struct TransportReply {
    result: Result<SamplePayload, String>,
}

impl TransportReply {
    /// A valid reply carrying a payload.
    #[must_use]
    pub fn ok(payload: SamplePayload) -> Self {
        Self {
            result: Ok(payload),
        }
    }

    /// An error-flagged reply. Never queued; the reply adapter drops it.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }

    /// Transport-reported validity flag.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The error text for an invalid reply.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }

    /// Consume the reply, yielding its payload if it was valid.
    #[must_use]
    pub fn into_payload(self) -> Option<SamplePayload> {
        self.result.ok()
    }
}
