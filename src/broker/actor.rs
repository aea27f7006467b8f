//! Broker state machine.
//!
//! One task owns both queues and processes every command or timer tick to
//! completion before touching the next, so no lock guards queue state. The
//! clock is read once per processed message.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::BrokerConfig;
use crate::protocol::{BrokerStats, MatchRef, Outcome, RequestHandle, Side};
use crate::queue::{Item, SojournQueue};

use super::metrics::BrokerMetrics;

pub(super) enum Command {
    Request {
        side: Side,
        handle: RequestHandle,
        waiter: oneshot::Sender<Outcome>,
    },
    Cancel {
        handle: RequestHandle,
        ack: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<BrokerStats>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

pub(super) struct BrokerActor {
    ask_queue: SojournQueue,
    ask_r_queue: SojournQueue,
    interval_ms: u64,
    next_sweep_at: u64,
    match_seq: u64,
    clock: Arc<dyn Clock>,
    metrics: Arc<BrokerMetrics>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl BrokerActor {
    pub(super) fn new(
        config: &BrokerConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<BrokerMetrics>,
        rx: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            ask_queue: SojournQueue::new(&config.ask),
            ask_r_queue: SojournQueue::new(&config.ask_r),
            interval_ms: config.interval_ms,
            next_sweep_at: 0,
            match_seq: 0,
            clock,
            metrics,
            rx,
        }
    }

    pub(super) async fn run(mut self) {
        let mut ticker = interval(Duration::from_millis(self.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.interval_ms, "broker started");

        loop {
            tokio::select! {
                command = self.rx.recv() => {
                    match command {
                        Some(command) => {
                            if !self.handle(command) {
                                return;
                            }
                        }
                        // Every handle dropped: nobody is left to ask or to
                        // observe outcomes.
                        None => {
                            let now = self.clock.now_ms();
                            self.terminate(now);
                            return;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let now = self.clock.now_ms();
                    if now >= self.next_sweep_at {
                        self.sweep(now);
                    }
                }
            }
        }
    }

    /// Process one command to completion. Returns false once terminating.
    fn handle(&mut self, command: Command) -> bool {
        let now = self.clock.now_ms();
        if now >= self.next_sweep_at {
            self.sweep(now);
        }

        match command {
            Command::Request {
                side,
                handle,
                waiter,
            } => {
                self.handle_request(now, side, handle, waiter);
                true
            }
            Command::Cancel { handle, ack } => {
                // Success is a notification either way; whether the item was
                // still pending stays internal.
                if self.ask_queue.cancel(handle) || self.ask_r_queue.cancel(handle) {
                    self.metrics.record_cancel();
                }
                let _ = ack.send(());
                true
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.stats());
                true
            }
            Command::Shutdown { ack } => {
                self.terminate(now);
                let _ = ack.send(());
                false
            }
        }
    }

    fn handle_request(
        &mut self,
        now: u64,
        side: Side,
        handle: RequestHandle,
        waiter: oneshot::Sender<Outcome>,
    ) {
        // Serve from the opposite queue first. Waiters that died while
        // queued are skipped silently; their removal is not an AQM drop.
        loop {
            let (served, dropped) = self.queue_mut(side.opposite()).dequeue(now);
            self.notify_dropped(now, dropped);
            match served {
                Some(peer) if peer.is_dead() => {
                    self.metrics.record_expired(1);
                }
                Some(peer) => {
                    if self.queue_mut(side.opposite()).is_empty() {
                        self.queue_mut(side.opposite()).join(now);
                    }
                    self.deliver_match(now, peer, handle, waiter);
                    return;
                }
                None => break,
            }
        }

        // Nobody is waiting on the other side: queue up on ours.
        let item = Item {
            start_ms: now,
            handle,
            waiter,
        };
        let dropped = self.queue_mut(side).enqueue(now, item);
        self.notify_dropped(now, dropped);
    }

    fn deliver_match(
        &mut self,
        now: u64,
        peer: Item,
        active_handle: RequestHandle,
        active: oneshot::Sender<Outcome>,
    ) {
        self.match_seq += 1;
        let reference = MatchRef(self.match_seq);
        let sojourn_ms = peer.sojourn_ms(now);
        let peer_handle = peer.handle;
        debug!(reference = reference.0, sojourn_ms, "matched pair");

        // Contract: the side that waited observes the match first.
        let _ = peer.complete(Outcome::Matched {
            reference,
            peer: active_handle,
            sojourn_ms,
        });
        let _ = active.send(Outcome::Matched {
            reference,
            peer: peer_handle,
            sojourn_ms: 0,
        });
        self.metrics.record_match();
    }

    fn notify_dropped(&mut self, now: u64, dropped: Vec<Item>) {
        if dropped.is_empty() {
            return;
        }
        self.metrics.record_drops(dropped.len() as u64);
        for item in dropped {
            let sojourn_ms = item.sojourn_ms(now);
            debug!(handle = item.handle.0, sojourn_ms, "dropped from queue");
            let _ = item.complete(Outcome::Dropped { sojourn_ms });
        }
    }

    /// Run AQM on both queues and purge dead waiters, then re-arm.
    fn sweep(&mut self, now: u64) {
        let dropped = self.ask_queue.timeout(now);
        self.notify_dropped(now, dropped);
        let dropped = self.ask_r_queue.timeout(now);
        self.notify_dropped(now, dropped);

        let purged = (self.ask_queue.purge_dead() + self.ask_r_queue.purge_dead()) as u64;
        self.metrics.record_expired(purged);

        self.next_sweep_at = now + self.interval_ms;
    }

    /// Permanent transition: every pending party observes a drop with its
    /// sojourn at shutdown.
    fn terminate(&mut self, now: u64) {
        let pending = self.ask_queue.len() + self.ask_r_queue.len();
        info!(pending, "broker terminating");

        let drained = self.ask_queue.drain();
        self.notify_dropped(now, drained);
        let drained = self.ask_r_queue.drain();
        self.notify_dropped(now, drained);
        self.ask_queue.join(now);
        self.ask_r_queue.join(now);
    }

    fn stats(&self) -> BrokerStats {
        BrokerStats {
            ask_len: self.ask_queue.len(),
            ask_r_len: self.ask_r_queue.len(),
            matched_pairs: self.metrics.matched_pairs.load(Ordering::Relaxed),
            dropped: self.metrics.dropped.load(Ordering::Relaxed),
            cancelled: self.metrics.cancelled.load(Ordering::Relaxed),
            expired_waiters: self.metrics.expired_waiters.load(Ordering::Relaxed),
        }
    }

    fn queue_mut(&mut self, side: Side) -> &mut SojournQueue {
        match side {
            Side::Ask => &mut self.ask_queue,
            Side::AskR => &mut self.ask_r_queue,
        }
    }
}
