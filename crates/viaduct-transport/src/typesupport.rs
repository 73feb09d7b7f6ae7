//! Type support: turning typed domain values into transport bytes and
//! back.
//!
//! The queuing subsystem never interprets payload contents; encoding and
//! decoding happen at the application-facing edge through these traits.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use thiserror::Error;

/// Errors from encoding or decoding a domain value.
#[derive(Debug, Error)]
pub enum TypeSupportError {
    /// The value could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// The bytes did not deserialize to the expected type.
    #[error("failed to decode message: {0}")]
    Decode(String),
}

/// A codec for one message type.
pub trait TypeSupport {
    /// The domain type carried over the wire.
    type Message;

    /// Serialize `message` into transport bytes.
    fn encode(&self, message: &Self::Message) -> Result<Vec<u8>, TypeSupportError>;

    /// Deserialize transport bytes into the domain type.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Message, TypeSupportError>;
}

/// Reference [`TypeSupport`] over bincode for any serde type.
pub struct BincodeTypeSupport<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeTypeSupport<T> {
    /// A codec for `T`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeTypeSupport<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeSupport for BincodeTypeSupport<T>
where
    T: Serialize + DeserializeOwned,
{
    type Message = T;

    fn encode(&self, message: &T) -> Result<Vec<u8>, TypeSupportError> {
        bincode::serialize(message).map_err(|e| TypeSupportError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, TypeSupportError> {
        bincode::deserialize(bytes).map_err(|e| TypeSupportError::Decode(e.to_string()))
    }
}

/// The request/response codec pair a service or client works with.
pub struct ServiceTypeSupport<Req, Res> {
    /// Codec for inbound requests.
    pub request: BincodeTypeSupport<Req>,
    /// Codec for outbound responses.
    pub response: BincodeTypeSupport<Res>,
}

impl<Req, Res> ServiceTypeSupport<Req, Res> {
    /// A codec pair for the service's request and response types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request: BincodeTypeSupport::new(),
            response: BincodeTypeSupport::new(),
        }
    }
}

impl<Req, Res> Default for ServiceTypeSupport<Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}
