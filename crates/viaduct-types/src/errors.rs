//! # Error Types
//!
//! The caller-misuse taxonomy reported by validated entry points.
//!
//! Transport anomalies (null deliveries, error-flagged replies) never
//! surface here; they are logged and dropped on the transport thread,
//! which has no application-level caller to report to. Queue overflow is
//! likewise not an error; it is the documented eviction policy.

use crate::events::EventKind;
use crate::ids::{EntityKind, InstanceToken};
use thiserror::Error;

/// Errors reported to the application-facing layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The requested event kind is outside the entity's supported set.
    /// Indicates a configuration defect upstream, never silently ignored.
    #[error("event kind {kind} is not supported by this {entity}")]
    UnsupportedEvent {
        /// The kind that was requested.
        kind: EventKind,
        /// The entity it was requested on.
        entity: EntityKind,
    },

    /// A handle created by one middleware instance was passed to another.
    #[error("handle belongs to instance {expected}, not {actual}")]
    WrongInstance {
        /// Token of the instance that owns the handle.
        expected: InstanceToken,
        /// Token presented by the caller.
        actual: InstanceToken,
    },

    /// A null or otherwise invalid argument from the owning layer.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An inbound request carried a sequence number that is already
    /// pending an answer. Recoverable by the caller; the duplicate is
    /// discarded.
    #[error("sequence number {0} already has a pending request")]
    DuplicateSequence(i64),
}
