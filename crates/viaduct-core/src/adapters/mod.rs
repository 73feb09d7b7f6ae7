//! Transport-facing glue: the delivery-thread callback entry points and
//! the helpers wiring entities to the in-memory transport.

pub mod binding;
pub mod callbacks;
