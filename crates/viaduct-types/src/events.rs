//! Event kinds and the status record carried through event queues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The event kinds the middleware dispatches.
///
/// The supported set is deliberately small: one QoS-incompatibility kind
/// per side of a topic. Subscriptions support
/// [`EventKind::RequestedQosIncompatible`], publishers support
/// [`EventKind::OfferedQosIncompatible`]; services and clients support
/// neither. Asking an entity for a kind outside its set is a caller error,
/// not a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The QoS requested by a subscription cannot be satisfied by a
    /// matched publisher.
    RequestedQosIncompatible,
    /// The QoS offered by a publisher cannot satisfy a matched
    /// subscription.
    OfferedQosIncompatible,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RequestedQosIncompatible => "requested_qos_incompatible",
            Self::OfferedQosIncompatible => "offered_qos_incompatible",
        };
        write!(f, "{name}")
    }
}

/// One status change for an event kind.
///
/// Counts follow the usual status-change convention: `total_count` is
/// cumulative since entity creation, `total_count_change` is the delta
/// since the status was last taken, `current_count` is the instantaneous
/// value. `detail` carries serialized information for more complex
/// statuses (e.g. which QoS policy was incompatible).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStatus {
    /// Cumulative occurrences since the entity was created.
    pub total_count: u64,
    /// Occurrences since the last take.
    pub total_count_change: u64,
    /// Instantaneous count (e.g. currently-incompatible matches).
    pub current_count: u64,
    /// Optional structured detail.
    pub detail: Option<serde_json::Value>,
}

impl EventStatus {
    /// Status with counts only and no detail.
    #[must_use]
    pub fn with_counts(total_count: u64, total_count_change: u64, current_count: u64) -> Self {
        Self {
            total_count,
            total_count_change,
            current_count,
            detail: None,
        }
    }
}
