//! Core protocol types for pairQ.
//!
//! Contains the side tag, the per-request correlation handle, the shared
//! match reference and the terminal `Outcome` delivered to every caller.

use serde::{Deserialize, Serialize};

/// Which of the two symmetric groups a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ask,
    AskR,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Ask => Side::AskR,
            Side::AskR => Side::Ask,
        }
    }
}

/// Correlation handle issued per request. Monotonic for the lifetime of the
/// broker, never reused. Also the cancel token for asynchronous requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RequestHandle(pub u64);

/// Reference shared by the two peers of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRef(pub u64);

/// Terminal event delivered exactly once per enqueued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Paired with a request from the opposite side. `peer` is the partner's
    /// handle. The side that waited sees its wait as `sojourn_ms`; the newly
    /// arrived side sees 0.
    Matched {
        reference: MatchRef,
        peer: RequestHandle,
        sojourn_ms: u64,
    },
    /// Shed by the queue discipline, capacity eviction or broker shutdown.
    Dropped { sojourn_ms: u64 },
}

impl Outcome {
    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self, Outcome::Matched { .. })
    }

    #[inline]
    pub fn sojourn_ms(&self) -> u64 {
        match *self {
            Outcome::Matched { sojourn_ms, .. } | Outcome::Dropped { sojourn_ms } => sojourn_ms,
        }
    }
}

/// Point-in-time broker observation: queue lengths plus lifetime counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokerStats {
    pub ask_len: usize,
    pub ask_r_len: usize,
    pub matched_pairs: u64,
    pub dropped: u64,
    pub cancelled: u64,
    pub expired_waiters: u64,
}
