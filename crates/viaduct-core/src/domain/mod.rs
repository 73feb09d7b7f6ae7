//! Domain primitives: the queue, notifier, relay, correlation table,
//! sequence generator, and delivered-item records.

pub mod correlation;
pub mod events;
pub mod notifier;
pub mod queue;
pub mod records;
pub mod sequence;
pub mod waitset;
