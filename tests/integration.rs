//! Public-API-only integration tests covering the channel's documented
//! end-to-end scenarios.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use canal::{channel, select, SelectError, SelectOp, SelectOutcome};

#[test]
fn scenario_capacity_two_single_producer_consumer() {
    let (tx, rx) = channel(2);
    let producer = thread::spawn(move || {
        for v in [b'A', b'B', b'C', b'D'] {
            tx.send(v).unwrap();
        }
    });

    let mut received = Vec::new();
    for _ in 0..4 {
        received.push(rx.recv().unwrap());
    }
    producer.join().unwrap();
    assert_eq!(received, vec![b'A', b'B', b'C', b'D']);
}

#[test]
fn scenario_close_wakes_blocked_receiver() {
    let (tx, rx) = channel::<u8>(1);
    let barrier = Arc::new(Barrier::new(2));
    let b = barrier.clone();
    let receiver = thread::spawn(move || {
        b.wait();
        rx.recv()
    });

    barrier.wait();
    thread::sleep(Duration::from_millis(20));
    assert!(tx.close().is_ok());
    assert!(receiver.join().unwrap().is_err());
}

#[test]
fn scenario_select_chooses_first_feasible() {
    let (tx_x, rx_x) = channel::<u8>(1);
    let (_tx_y, rx_y) = channel::<u8>(1);
    tx_x.send(7).unwrap();

    let mut ops = [SelectOp::recv(&rx_x), SelectOp::recv(&rx_y)];
    let (index, outcome) = select(&mut ops).unwrap();
    assert_eq!(index, 0);
    assert!(matches!(outcome, SelectOutcome::Received(7)));
}

#[test]
fn scenario_select_blocks_then_wakes() {
    let (_tx_x, rx_x) = channel::<u8>(1);
    let (tx_y, rx_y) = channel::<u8>(1);

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        tx_y.send(9).unwrap();
    });

    let mut ops = [SelectOp::recv(&rx_x), SelectOp::recv(&rx_y)];
    let (index, outcome) = select(&mut ops).unwrap();
    assert_eq!(index, 1);
    assert!(matches!(outcome, SelectOutcome::Received(9)));
    sender.join().unwrap();
}

#[test]
fn scenario_select_on_closed_channel() {
    let (tx_x, rx_x) = channel::<u8>(1);
    tx_x.close().unwrap();

    let mut ops = [SelectOp::send(&tx_x, 1u8)];
    match select(&mut ops) {
        Err(SelectError::Closed(0)) => {}
        other => panic!("expected Closed(0), got index-ok={:?}", other.is_ok()),
    }
    drop(rx_x);
}

#[test]
fn scenario_concurrent_senders_one_receiver_fifo_per_sender() {
    let (tx, rx) = channel::<i32>(4);
    let tx1 = tx.clone();
    let tx2 = tx.clone();
    drop(tx);

    let s1 = thread::spawn(move || {
        for v in [1, 2, 3] {
            tx1.send(v).unwrap();
        }
    });
    let s2 = thread::spawn(move || {
        for v in [10, 20, 30] {
            tx2.send(v).unwrap();
        }
    });

    let mut got = Vec::new();
    for _ in 0..6 {
        got.push(rx.recv().unwrap());
    }
    s1.join().unwrap();
    s2.join().unwrap();

    let stream_a: Vec<_> = got.iter().copied().filter(|v| *v < 10).collect();
    let stream_b: Vec<_> = got.iter().copied().filter(|v| *v >= 10).collect();
    assert_eq!(stream_a, vec![1, 2, 3]);
    assert_eq!(stream_b, vec![10, 20, 30]);
}

#[test]
fn nonblocking_boundary_behaviors() {
    let (tx, rx) = channel::<u8>(1);
    tx.send(1).unwrap();
    assert!(matches!(
        tx.try_send(2),
        Err(canal::TrySendError::WouldBlock(2))
    ));
    assert_eq!(rx.recv().unwrap(), 1);
    assert_eq!(rx.try_recv(), Err(canal::TryRecvError::WouldBlock));
}

#[test]
fn destroy_boundary_behavior() {
    let (tx, rx) = channel::<u8>(1);
    assert!(canal::destroy(&tx, &rx).is_err());
    // Channel remains usable after a failed destroy.
    tx.send(42).unwrap();
    assert_eq!(rx.recv().unwrap(), 42);

    tx.close().unwrap();
    assert!(canal::destroy(&tx, &rx).is_ok());
}

#[test]
fn stress_many_senders_one_receiver() {
    const SENDERS: usize = 8;
    const PER_SENDER: i32 = 200;

    let (tx, rx) = channel::<(usize, i32)>(16);
    let handles: Vec<_> = (0..SENDERS)
        .map(|id| {
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..PER_SENDER {
                    tx.send((id, i)).unwrap();
                }
            })
        })
        .collect();
    drop(tx);

    let mut last_seen = vec![-1; SENDERS];
    let mut total = 0;
    while total < SENDERS * PER_SENDER as usize {
        let (id, value) = rx.recv().unwrap();
        assert!(
            value > last_seen[id],
            "sender {} delivered out of order: {} after {}",
            id,
            value,
            last_seen[id]
        );
        last_seen[id] = value;
        total += 1;
    }

    for h in handles {
        h.join().unwrap();
    }
}
