//! # Viaduct Shared Types
//!
//! Cross-crate vocabulary for the middleware adaptation layer: entity
//! identities, the per-instance capability token, QoS configuration, the
//! supported event kinds, and the caller-facing error taxonomy.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type exchanged between the core,
//!   the transport surface, and the application-facing layer lives here.
//! - **Capability over globals**: instance membership is proven with a
//!   passed-in [`InstanceToken`], never a process-wide constant, so
//!   multiple independent middleware instances can coexist in one process.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod events;
pub mod ids;
pub mod qos;

// Re-export main types
pub use errors::AdapterError;
pub use events::{EventKind, EventStatus};
pub use ids::{EntityKind, GlobalId, InstanceToken};
pub use qos::{Durability, QosProfile, Reliability, DEFAULT_QUEUE_DEPTH};
