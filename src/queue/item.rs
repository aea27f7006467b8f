//! Queued request record.

use tokio::sync::oneshot;

use crate::protocol::{Outcome, RequestHandle};

/// One waiting request. `start_ms` is fixed at enqueue and never mutated.
/// The oneshot sender is both the delivery path for the terminal outcome and
/// the liveness observation for the waiting caller.
#[derive(Debug)]
pub struct Item {
    pub start_ms: u64,
    pub handle: RequestHandle,
    pub waiter: oneshot::Sender<Outcome>,
}

impl Item {
    #[inline]
    pub fn sojourn_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_ms)
    }

    /// True when the waiting caller is gone (its receiver was dropped).
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.waiter.is_closed()
    }

    /// Deliver the terminal outcome. Returns false if the caller died first.
    #[inline]
    pub fn complete(self, outcome: Outcome) -> bool {
        self.waiter.send(outcome).is_ok()
    }
}
