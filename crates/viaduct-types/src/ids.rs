//! Entity identities and the per-instance capability token.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The 16-byte global identity stamped on publishers, clients, and other
/// entities so deliveries can be attributed to their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId([u8; 16]);

impl GlobalId {
    /// Size of the identity in bytes.
    pub const SIZE: usize = 16;

    /// Generate a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// The all-zero identity, used when the origin is unknown.
    #[must_use]
    pub const fn nil() -> Self {
        Self([0u8; 16])
    }

    /// Construct from raw bytes (e.g. copied out of a transport sample).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw 16 bytes of the identity.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Capability value identifying one middleware instance.
///
/// Every entity stores the token of the instance that created it; entry
/// points compare the caller's token against the entity's before
/// dispatching. A mismatch means the handle was passed to the wrong
/// instance and is reported as [`crate::AdapterError::WrongInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceToken(Uuid);

impl InstanceToken {
    /// Mint the token for a new middleware instance.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for InstanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of entities that own a delivery queue, notifier, and relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A topic subscription receiving messages.
    Subscription,
    /// A topic publisher (events only, no delivery queue).
    Publisher,
    /// A service receiving queries and sending replies.
    Service,
    /// A client sending requests and receiving replies.
    Client,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subscription => "subscription",
            Self::Publisher => "publisher",
            Self::Service => "service",
            Self::Client => "client",
        };
        write!(f, "{name}")
    }
}
