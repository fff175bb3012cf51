//! Manual smoke-test binary: spins up a configurable number of producer and
//! consumer threads on one channel and a select loop across two more,
//! logging every step.
//!
//! Run with `RUST_LOG=canal=trace cargo run --bin canal-demo -- 4 2` to watch
//! the full registration/probe/wakeup/deregistration protocol with 4
//! producers and 2 consumers (defaults to 2 producers, 2 consumers if no
//! arguments are given).

use std::thread;
use std::time::Duration;

use canal::{channel, select, SelectOp};

struct Config {
    producers: usize,
    consumers: usize,
}

fn parse_config() -> Config {
    let mut args = std::env::args().skip(1);
    let producers = args.next().and_then(|s| s.parse().ok()).unwrap_or(2);
    let consumers = args.next().and_then(|s| s.parse().ok()).unwrap_or(2);
    Config { producers, consumers }
}

fn run_producer_consumer(config: &Config) {
    const PER_PRODUCER: u32 = 8;
    let (tx, rx) = channel::<u32>(4);

    let producers: Vec<_> = (0..config.producers)
        .map(|id| {
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let value = id as u32 * PER_PRODUCER + i;
                    tx.send(value).expect("producer: channel closed unexpectedly");
                    println!("producer {}: sent {}", id, value);
                }
            })
        })
        .collect();
    drop(tx);

    let consumers: Vec<_> = (0..config.consumers)
        .map(|id| {
            let rx = rx.clone();
            thread::spawn(move || loop {
                match rx.recv() {
                    Ok(v) => println!("consumer {}: received {}", id, v),
                    Err(_) => break,
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer thread panicked");
    }
    // Every sender clone has dropped by now except this one; closing it
    // unblocks every consumer still waiting on an empty channel.
    rx.close().ok();

    for consumer in consumers {
        consumer.join().expect("consumer thread panicked");
    }
}

fn run_select_loop() {
    let (tx_a, rx_a) = channel::<&'static str>(1);
    let (tx_b, rx_b) = channel::<&'static str>(1);

    let feeder = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        tx_a.send("from a").unwrap();
        thread::sleep(Duration::from_millis(10));
        tx_b.send("from b").unwrap();
        tx_a.close().unwrap();
        tx_b.close().unwrap();
    });

    loop {
        let mut ops = [SelectOp::recv(&rx_a), SelectOp::recv(&rx_b)];
        match select(&mut ops) {
            Ok((index, canal::SelectOutcome::Received(v))) => {
                println!("select: entry {} produced {:?}", index, v)
            }
            Ok((_, canal::SelectOutcome::Sent)) => unreachable!("no send entries registered"),
            Err(canal::SelectError::Closed(index)) => {
                println!("select: entry {} closed, stopping", index);
                break;
            }
            Err(err) => {
                println!("select: {}", err);
                break;
            }
        }
    }

    feeder.join().expect("feeder thread panicked");
}

fn main() {
    env_logger::init();
    let config = parse_config();
    println!(
        "-- producer/consumer ({} producers, {} consumers) --",
        config.producers, config.consumers
    );
    run_producer_consumer(&config);
    println!("-- select loop --");
    run_select_loop();
}
