//! Active queue management strategies.
//!
//! Module organization:
//!
//! - `timeout.rs` - age-based head drops with a deadline memo
//! - `codel.rs` - CoDel controller over sojourn time
//! - `codel_timeout.rs` - CoDel constrained to at least the timeout drops
//!
//! Every strategy exposes the same hook table. The three dropping hooks run
//! one shared routine per strategy, so the drop decision is a function of
//! `(now, queue, state)` regardless of which operation asked, and repeating
//! a hook at the same instant drops nothing further. Dropped items are
//! returned to the owner, which computes sojourns and notifies callers.

mod codel;
mod codel_timeout;
mod timeout;

pub use codel::CodelState;
pub use codel_timeout::CodelTimeoutState;
pub use timeout::TimeoutState;

use std::collections::VecDeque;

use crate::config::AqmSpec;

use super::item::Item;

/// Strategy state, dispatched by tag.
#[derive(Debug)]
pub enum AqmState {
    Naive,
    Timeout(TimeoutState),
    Codel(CodelState),
    CodelTimeout(CodelTimeoutState),
}

impl AqmState {
    pub fn new(spec: &AqmSpec) -> Self {
        match *spec {
            AqmSpec::Naive => AqmState::Naive,
            AqmSpec::Timeout { after_ms } => AqmState::Timeout(TimeoutState::new(after_ms)),
            AqmSpec::Codel {
                target_ms,
                interval_ms,
            } => AqmState::Codel(CodelState::new(target_ms, interval_ms)),
            AqmSpec::CodelTimeout {
                target_ms,
                interval_ms,
                after_ms,
            } => AqmState::CodelTimeout(CodelTimeoutState::new(target_ms, interval_ms, after_ms)),
        }
    }

    /// Hook run after a new item was appended.
    pub fn on_enqueue(&mut self, now: u64, queue: &mut VecDeque<Item>) -> Vec<Item> {
        self.run(now, queue)
    }

    /// Hook run before serving a waiter.
    pub fn on_dequeue(&mut self, now: u64, queue: &mut VecDeque<Item>) -> Vec<Item> {
        self.run(now, queue)
    }

    /// Periodic sweep hook.
    pub fn on_timeout(&mut self, now: u64, queue: &mut VecDeque<Item>) -> Vec<Item> {
        self.run(now, queue)
    }

    /// Reset hook for a queue that emptied as a whole. Never drops.
    pub fn on_join(&mut self, _now: u64, queue: &VecDeque<Item>) {
        match self {
            AqmState::Naive => {}
            AqmState::Timeout(state) => state.join(queue),
            AqmState::Codel(state) => state.join(),
            AqmState::CodelTimeout(state) => state.join(queue),
        }
    }

    fn run(&mut self, now: u64, queue: &mut VecDeque<Item>) -> Vec<Item> {
        match self {
            AqmState::Naive => Vec::new(),
            AqmState::Timeout(state) => state.run(now, queue),
            AqmState::Codel(state) => state.run(now, queue),
            AqmState::CodelTimeout(state) => state.run(now, queue),
        }
    }
}
