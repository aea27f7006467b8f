//! Lifetime counters with atomic updates, O(1) to read.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct BrokerMetrics {
    pub matched_pairs: AtomicU64,
    pub dropped: AtomicU64,
    pub cancelled: AtomicU64,
    pub expired_waiters: AtomicU64,
}

impl BrokerMetrics {
    #[inline]
    pub fn record_match(&self) {
        self.matched_pairs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_drops(&self, count: u64) {
        if count > 0 {
            self.dropped.fetch_add(count, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_cancel(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_expired(&self, count: u64) {
        if count > 0 {
            self.expired_waiters.fetch_add(count, Ordering::Relaxed);
        }
    }
}
