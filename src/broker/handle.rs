//! Caller-facing broker handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{BrokerConfig, ConfigError};
use crate::protocol::{BrokerStats, Outcome, RequestHandle, Side};

use super::actor::{BrokerActor, Command};
use super::metrics::BrokerMetrics;

/// Cheaply cloneable handle to a running broker task.
#[derive(Clone)]
pub struct Broker {
    tx: mpsc::UnboundedSender<Command>,
    next_handle: Arc<AtomicU64>,
    metrics: Arc<BrokerMetrics>,
}

impl Broker {
    /// Validate `config` and spawn the broker task on the current runtime.
    pub fn spawn(config: BrokerConfig) -> Result<Broker, ConfigError> {
        Self::spawn_with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Like [`Broker::spawn`] with a caller-supplied clock.
    pub fn spawn_with_clock(
        config: BrokerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Broker, ConfigError> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let metrics = Arc::new(BrokerMetrics::default());
        let actor = BrokerActor::new(&config, clock, Arc::clone(&metrics), rx);
        tokio::spawn(actor.run());
        Ok(Broker {
            tx,
            next_handle: Arc::new(AtomicU64::new(1)),
            metrics,
        })
    }

    /// Request a match against the `ask_r` side and wait for the terminal
    /// outcome.
    pub async fn ask(&self) -> Outcome {
        self.request(Side::Ask).await
    }

    /// Request a match against the `ask` side and wait for the terminal
    /// outcome.
    pub async fn ask_r(&self) -> Outcome {
        self.request(Side::AskR).await
    }

    /// Enqueue an `ask` without waiting. The receiver yields the terminal
    /// outcome; a cancelled handle's receiver closes without one.
    pub fn async_ask(&self) -> (RequestHandle, oneshot::Receiver<Outcome>) {
        self.submit(Side::Ask)
    }

    /// Enqueue an `ask_r` without waiting.
    pub fn async_ask_r(&self) -> (RequestHandle, oneshot::Receiver<Outcome>) {
        self.submit(Side::AskR)
    }

    /// Remove a pending request. Always succeeds; cancelling a handle whose
    /// outcome was already delivered (or that never existed) is a no-op.
    pub async fn cancel(&self, handle: RequestHandle) {
        let (ack, rx) = oneshot::channel();
        if self.tx.send(Command::Cancel { handle, ack }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Queue lengths and lifetime counters.
    pub async fn stats(&self) -> BrokerStats {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Stats { reply }).is_err() {
            return self.counters_snapshot();
        }
        match rx.await {
            Ok(stats) => stats,
            Err(_) => self.counters_snapshot(),
        }
    }

    /// Stop the broker. Every pending request observes `Dropped` with its
    /// sojourn at shutdown. Idempotent; later requests are dropped at once.
    pub async fn shutdown(&self) {
        let (ack, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown { ack }).is_ok() {
            let _ = rx.await;
        }
    }

    async fn request(&self, side: Side) -> Outcome {
        let (_, rx) = self.submit(side);
        // A closed reply channel means the broker already terminated.
        rx.await.unwrap_or(Outcome::Dropped { sojourn_ms: 0 })
    }

    fn submit(&self, side: Side) -> (RequestHandle, oneshot::Receiver<Outcome>) {
        let handle = RequestHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let (waiter, rx) = oneshot::channel();
        let request = Command::Request {
            side,
            handle,
            waiter,
        };
        if let Err(mpsc::error::SendError(request)) = self.tx.send(request) {
            // Broker already terminated: deliver the drop ourselves so the
            // caller still sees exactly one terminal event.
            if let Command::Request { waiter, .. } = request {
                let _ = waiter.send(Outcome::Dropped { sojourn_ms: 0 });
            }
        }
        (handle, rx)
    }

    /// Counters survive the actor; queue lengths are zero once it stopped.
    fn counters_snapshot(&self) -> BrokerStats {
        BrokerStats {
            ask_len: 0,
            ask_r_len: 0,
            matched_pairs: self.metrics.matched_pairs.load(Ordering::Relaxed),
            dropped: self.metrics.dropped.load(Ordering::Relaxed),
            cancelled: self.metrics.cancelled.load(Ordering::Relaxed),
            expired_waiters: self.metrics.expired_waiters.load(Ordering::Relaxed),
        }
    }
}
