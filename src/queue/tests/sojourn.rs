//! Managed queue tests: serve/drop directions, capacity, cancel, purge.

use super::*;

#[test]
fn fifo_serves_in_arrival_order() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 4);
    for (t, h) in [(0, 1), (1, 2), (2, 3)] {
        let (item, _rx) = item(t, h);
        assert!(q.enqueue(t, item).is_empty());
    }

    let (served, dropped) = q.dequeue(3);
    assert!(dropped.is_empty());
    assert_eq!(served.map(|i| i.handle.0), Some(1));
    assert_eq!(q.len(), 2);
}

#[test]
fn lifo_serves_the_newest_item() {
    let mut q = queue(AqmSpec::Naive, OutMode::Lifo, DropMode::Head, 4);
    for (t, h) in [(0, 1), (1, 2), (2, 3)] {
        let (item, _rx) = item(t, h);
        q.enqueue(t, item);
    }

    let (served, _) = q.dequeue(3);
    assert_eq!(served.map(|i| i.handle.0), Some(3));
    assert_eq!(q.peek_sojourn(3), Some(2));
}

#[test]
fn overflow_evicts_from_the_head() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 2);
    let (a, _rx_a) = item(0, 1);
    let (b, _rx_b) = item(1, 2);
    let (c, _rx_c) = item(2, 3);
    q.enqueue(0, a);
    q.enqueue(1, b);

    let dropped = q.enqueue(2, c);
    assert_eq!(handles(&dropped), vec![1]);
    assert_eq!(dropped[0].sojourn_ms(2), 2);
    assert_eq!(q.len(), 2);
}

#[test]
fn overflow_on_the_tail_bounces_the_caller_itself() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Tail, 2);
    let (a, _rx_a) = item(0, 1);
    let (b, _rx_b) = item(1, 2);
    let (c, _rx_c) = item(2, 3);
    q.enqueue(0, a);
    q.enqueue(1, b);

    let dropped = q.enqueue(2, c);
    assert_eq!(handles(&dropped), vec![3]);
    assert_eq!(dropped[0].sojourn_ms(2), 0);
}

#[test]
fn length_never_exceeds_capacity() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 3);
    let mut receivers = Vec::new();
    for h in 0..50 {
        let (item, rx) = item(h, h);
        receivers.push(rx);
        q.enqueue(h, item);
        assert!(q.len() <= 3);
    }
    assert_eq!(q.len(), 3);
}

#[test]
fn cancel_removes_only_the_named_item() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 4);
    let (a, _rx_a) = item(0, 1);
    let (b, _rx_b) = item(0, 2);
    q.enqueue(0, a);
    q.enqueue(0, b);

    assert!(q.cancel(RequestHandle(1)));
    assert!(!q.cancel(RequestHandle(1)));
    assert!(!q.cancel(RequestHandle(99)));
    assert_eq!(q.len(), 1);

    let (served, _) = q.dequeue(0);
    assert_eq!(served.map(|i| i.handle.0), Some(2));
}

#[test]
fn cancelled_item_closes_its_receiver_without_an_outcome() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 4);
    let (a, mut rx) = item(0, 1);
    q.enqueue(0, a);
    assert!(q.cancel(RequestHandle(1)));

    assert!(rx.try_recv().is_err());
}

#[test]
fn purge_removes_dead_waiters_silently() {
    let mut q = queue(AqmSpec::Naive, OutMode::Fifo, DropMode::Head, 4);
    let (a, rx_a) = item(0, 1);
    let (b, _rx_b) = item(0, 2);
    q.enqueue(0, a);
    q.enqueue(0, b);

    drop(rx_a);
    assert_eq!(q.purge_dead(), 1);
    assert_eq!(q.len(), 1);
    assert_eq!(q.purge_dead(), 0);
}

#[test]
fn drain_returns_everything_in_order() {
    let mut q = queue(AqmSpec::Naive, OutMode::Lifo, DropMode::Head, 4);
    let mut receivers = Vec::new();
    for h in 1..=3 {
        let (item, rx) = item(0, h);
        receivers.push(rx);
        q.enqueue(0, item);
    }

    let drained = q.drain();
    assert_eq!(handles(&drained), vec![1, 2, 3]);
    assert!(q.is_empty());
}
