//! QoS configuration consumed by entities.
//!
//! The single knob the queuing subsystem reads is `depth`; the contract is
//! `effective depth = max(configured, 1)` so eviction-then-insert on an
//! empty queue can never occur downstream.

use serde::{Deserialize, Serialize};

/// Default history depth when the application does not configure one.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Reliability of delivery, as negotiated with the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    /// Every sample is retransmitted until acknowledged.
    Reliable,
    /// Samples may be lost under congestion.
    BestEffort,
}

/// Durability of samples for late-joining subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Durability {
    /// Samples exist only while in flight.
    Volatile,
    /// The transport caches samples for late joiners.
    TransientLocal,
}

/// The QoS profile attached to an entity at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosProfile {
    /// Configured history depth. A value of 0 is tolerated here and
    /// clamped by [`QosProfile::effective_depth`].
    pub depth: usize,
    /// Delivery reliability.
    pub reliability: Reliability,
    /// Sample durability.
    pub durability: Durability,
}

impl QosProfile {
    /// Profile with the given depth and default reliability/durability.
    #[must_use]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// The depth actually handed to delivery queues: never 0.
    #[must_use]
    pub fn effective_depth(&self) -> usize {
        self.depth.max(1)
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self {
            depth: DEFAULT_QUEUE_DEPTH,
            reliability: Reliability::Reliable,
            durability: Durability::Volatile,
        }
    }
}
