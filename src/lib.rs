//! pairQ - sojourn-aware match broker.
//!
//! Matches requests from two symmetric groups (`ask` and `ask_r`) into
//! pairs. The first side to arrive waits in a per-side queue; the second
//! triggers the pairing, and both parties observe a shared match reference
//! together with the waiter's sojourn time. Each queue runs an active queue
//! management discipline (naive, timeout, CoDel or a composition) that sheds
//! load before queueing latency collapses.

pub mod broker;
pub mod clock;
pub mod config;
pub mod protocol;
pub mod queue;
pub mod telemetry;
