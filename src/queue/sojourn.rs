//! Managed queue: an ordered item sequence with an AQM discipline, a serve
//! direction, a capacity and a drop side.

use std::collections::VecDeque;

use crate::config::{DropMode, OutMode, QueueSpec};
use crate::protocol::RequestHandle;

use super::aqm::AqmState;
use super::item::Item;

pub struct SojournQueue {
    buf: VecDeque<Item>,
    aqm: AqmState,
    out_mode: OutMode,
    drop_mode: DropMode,
    capacity: usize,
}

impl SojournQueue {
    pub fn new(spec: &QueueSpec) -> Self {
        Self {
            buf: VecDeque::new(),
            aqm: AqmState::new(&spec.algorithm),
            out_mode: spec.out_mode,
            drop_mode: spec.drop_mode,
            capacity: spec.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Sojourn of the item that would be served next, if any.
    pub fn peek_sojourn(&self, now: u64) -> Option<u64> {
        let item = match self.out_mode {
            OutMode::Fifo => self.buf.front(),
            OutMode::Lifo => self.buf.back(),
        };
        item.map(|item| item.sojourn_ms(now))
    }

    /// Append an item, run the AQM hook, then evict from the drop side until
    /// the queue fits its capacity again. The appended item itself may be
    /// among the returned drops.
    pub fn enqueue(&mut self, now: u64, item: Item) -> Vec<Item> {
        self.buf.push_back(item);
        let mut dropped = self.aqm.on_enqueue(now, &mut self.buf);
        while self.buf.len() > self.capacity {
            let evicted = match self.drop_mode {
                DropMode::Head => self.buf.pop_front(),
                DropMode::Tail => self.buf.pop_back(),
            };
            dropped.extend(evicted);
        }
        dropped
    }

    /// Run the AQM hook, then serve one item from the out side.
    pub fn dequeue(&mut self, now: u64) -> (Option<Item>, Vec<Item>) {
        let dropped = self.aqm.on_dequeue(now, &mut self.buf);
        let served = match self.out_mode {
            OutMode::Fifo => self.buf.pop_front(),
            OutMode::Lifo => self.buf.pop_back(),
        };
        (served, dropped)
    }

    /// Periodic AQM sweep.
    pub fn timeout(&mut self, now: u64) -> Vec<Item> {
        self.aqm.on_timeout(now, &mut self.buf)
    }

    /// AQM reset for a queue that emptied as a whole.
    pub fn join(&mut self, now: u64) {
        self.aqm.on_join(now, &self.buf);
    }

    /// Remove a pending item by handle. Returns whether it was present.
    pub fn cancel(&mut self, handle: RequestHandle) -> bool {
        match self.buf.iter().position(|item| item.handle == handle) {
            Some(idx) => {
                self.buf.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove items whose caller is gone. Silent: these are not AQM drops
    /// and there is nobody left to notify.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.buf.len();
        self.buf.retain(|item| !item.is_dead());
        before - self.buf.len()
    }

    /// Empty the queue, returning every pending item (shutdown path).
    pub fn drain(&mut self) -> Vec<Item> {
        self.buf.drain(..).collect()
    }
}
