//! Broker state machine and caller-facing API.
//!
//! Module organization:
//!
//! - `actor.rs` - the single-task state machine owning both queues
//! - `handle.rs` - cloneable caller handle (ask/ask_r, async variants,
//!   cancel, stats, shutdown)
//! - `metrics.rs` - lifetime counters
//!
//! Callers talk to the actor through one ordered command channel; the actor
//! runs each command or timer tick to completion. Within a match the passive
//! peer (the side that waited) is always notified before the active peer.

mod actor;
mod handle;
mod metrics;

#[cfg(test)]
mod tests;

pub use handle::Broker;
pub use metrics::BrokerMetrics;
