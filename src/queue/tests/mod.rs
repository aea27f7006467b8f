//! Queue-layer tests: managed queue mechanics and AQM drop rules.

mod sojourn;

use tokio::sync::oneshot;

use crate::config::{AqmSpec, DropMode, OutMode, QueueSpec};
use crate::protocol::{Outcome, RequestHandle};

use super::{Item, SojournQueue};

fn item(start_ms: u64, handle: u64) -> (Item, oneshot::Receiver<Outcome>) {
    let (waiter, rx) = oneshot::channel();
    (
        Item {
            start_ms,
            handle: RequestHandle(handle),
            waiter,
        },
        rx,
    )
}

fn queue(algorithm: AqmSpec, out_mode: OutMode, drop_mode: DropMode, capacity: usize) -> SojournQueue {
    SojournQueue::new(&QueueSpec {
        algorithm,
        out_mode,
        capacity,
        drop_mode,
    })
}

fn handles(items: &[Item]) -> Vec<u64> {
    items.iter().map(|item| item.handle.0).collect()
}
