//! Shutdown drain tests.

use super::*;

#[tokio::test]
async fn shutdown_drops_all_pending_with_their_sojourn() {
    let (broker, clock) = setup(naive_config(4));

    let (_h1, rx1) = broker.async_ask();
    let (_h2, rx2) = broker.async_ask();
    settle(&broker).await;
    clock.advance(7);
    broker.shutdown().await;

    assert_eq!(rx1.await.expect("outcome"), Outcome::Dropped { sojourn_ms: 7 });
    assert_eq!(rx2.await.expect("outcome"), Outcome::Dropped { sojourn_ms: 7 });

    let stats = broker.stats().await;
    assert_eq!(stats.ask_len, 0);
    assert_eq!(stats.ask_r_len, 0);
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.matched_pairs, 0);
}

#[tokio::test]
async fn requests_after_shutdown_are_dropped_immediately() {
    let (broker, _clock) = setup(naive_config(4));

    broker.shutdown().await;
    assert_eq!(broker.ask().await, Outcome::Dropped { sojourn_ms: 0 });
    assert_eq!(broker.ask_r().await, Outcome::Dropped { sojourn_ms: 0 });

    // Shutting down again is a no-op.
    broker.shutdown().await;
}
