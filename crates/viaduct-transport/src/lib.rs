//! # Viaduct Transport Surface
//!
//! The transport- and type-support-collaborator interfaces consumed by the
//! queuing subsystem, plus an in-memory reference transport for tests and
//! single-process deployments.
//!
//! The queuing core never interprets payload contents; everything crossing
//! this boundary is an opaque handle:
//!
//! - [`SamplePayload`]: reference-counted bytes with origin identity and
//!   a source timestamp. Cloning is a cheap refcount increment; the bytes
//!   are released when the last handle drops.
//! - [`TransportQuery`]: an inbound request. [`TransportQuery::dup`]
//!   takes a durable copy that outlives the delivery callback's stack
//!   frame; the reply path is one-shot.
//! - [`TransportReply`]: an inbound reply, owned by value once the
//!   delivery callback hands it over. Consuming it is the only way to get
//!   at the payload, so a double release cannot be expressed.
//!
//! Deliveries from [`InMemoryTransport`] run on a transport-owned worker
//! thread, never on the thread that published.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod clock;
pub mod handles;
pub mod session;
pub mod typesupport;

// Re-export main types
pub use handles::{SamplePayload, TransportQuery, TransportReply};
pub use session::{
    InMemoryTransport, QueryCallback, QueryableHandle, ReplyCallback, SampleCallback,
    SubscriberHandle, TransportPublisher,
};
pub use typesupport::{BincodeTypeSupport, ServiceTypeSupport, TypeSupport, TypeSupportError};
