//! Broker scenario tests.

mod shutdown;

use std::sync::Arc;

use crate::clock::ManualClock;
use crate::config::{AqmSpec, BrokerConfig, DropMode, OutMode, QueueSpec};
use crate::protocol::{Outcome, RequestHandle};

use super::Broker;

fn naive_config(capacity: usize) -> BrokerConfig {
    let spec = QueueSpec {
        algorithm: AqmSpec::Naive,
        out_mode: OutMode::Fifo,
        capacity,
        drop_mode: DropMode::Head,
    };
    BrokerConfig {
        ask: spec.clone(),
        ask_r: spec,
        interval_ms: 10,
    }
}

fn setup(config: BrokerConfig) -> (Broker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let broker = Broker::spawn_with_clock(config, clock.clone()).expect("valid config");
    (broker, clock)
}

/// Round-trip through the actor so every previously sent command has been
/// processed when this returns.
async fn settle(broker: &Broker) {
    let _ = broker.stats().await;
}
