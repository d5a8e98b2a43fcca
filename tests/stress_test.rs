//! Load and timing tests for the dispatcher lanes.

use crossbeam_channel::unbounded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use trilane::{Dispatcher, Lane, PoolConfig, SaturationPolicy, ThreadFactory, UiLane, WorkerPool};

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_default_compute_rejects_overflow() {
    // default shape: bounded queue of 1024, max threads = 2 * cpus + 1
    let pool = WorkerPool::new(PoolConfig::compute()).unwrap();

    let mut accepted = 0usize;
    let mut rejected = 0usize;
    for _ in 0..2000 {
        let result = pool.submit(Box::new(|| {
            thread::sleep(Duration::from_millis(50));
        }));
        match result {
            Ok(()) => accepted += 1,
            Err(_) => rejected += 1,
        }
    }

    assert!(accepted >= 1024, "accepted only {accepted}");
    assert!(rejected > 0, "expected overflow past capacity + max threads");
}

#[test]
#[ignore]
fn stress_test_idle_workers_retire_to_core() {
    let pool = WorkerPool::new(
        PoolConfig::builder()
            .core_threads(1)
            .max_threads(4)
            .queue_capacity(Some(1))
            .keep_alive(Duration::from_millis(100))
            .thread_name_prefix("retire")
            .build()
            .unwrap(),
    )
    .unwrap();
    let (gate_tx, gate_rx) = unbounded::<()>();

    // grow the pool to its max
    for _ in 0..5 {
        let gate = gate_rx.clone();
        pool.submit(Box::new(move || {
            let _ = gate.recv();
        }))
        .unwrap();
    }
    assert_eq!(pool.live_threads(), 4);

    for _ in 0..5 {
        gate_tx.send(()).unwrap();
    }

    // extra workers retire after the keep-alive elapses
    thread::sleep(Duration::from_secs(1));
    assert_eq!(pool.live_threads(), 1);
}

#[test]
#[ignore]
fn stress_test_concurrent_submitters() {
    let pool = Arc::new(
        WorkerPool::new(
            PoolConfig::builder()
                .core_threads(4)
                .max_threads(8)
                .queue_capacity(Some(4096))
                .thread_name_prefix("many")
                .build()
                .unwrap(),
        )
        .unwrap(),
    );
    let counter = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..100 {
                    let counter = Arc::clone(&counter);
                    pool.submit(Box::new(move || {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }))
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in submitters {
        handle.join().unwrap();
    }

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while counter.load(Ordering::Relaxed) < 800 && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(counter.load(Ordering::Relaxed), 800);
}

#[test]
#[ignore]
fn stress_test_concurrent_shutdown_is_serialized() {
    let dispatcher = Arc::new(Dispatcher::new(
        WorkerPool::new(PoolConfig::io()).unwrap(),
        WorkerPool::new(
            PoolConfig::builder()
                .core_threads(2)
                .max_threads(4)
                .queue_capacity(Some(64))
                .thread_name_prefix("race#worker")
                .build()
                .unwrap(),
        )
        .unwrap(),
        UiLane::spawn(&ThreadFactory::new("race#ui", None)).unwrap(),
    ));

    // submissions racing the shutdown either land or fail cleanly
    let racers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for _ in 0..50 {
                    let _ = dispatcher.dispatch(Lane::Compute, || {});
                }
            })
        })
        .collect();
    let stoppers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || dispatcher.shutdown())
        })
        .collect();

    for handle in racers.into_iter().chain(stoppers) {
        handle.join().unwrap();
    }

    assert!(dispatcher.io().is_shut_down());
    assert!(dispatcher.compute().is_shut_down());
    assert!(dispatcher.dispatch(Lane::Compute, || {}).is_err());
}

#[test]
#[ignore]
fn stress_test_discard_under_sustained_overflow() {
    let pool = WorkerPool::new(
        PoolConfig::builder()
            .core_threads(1)
            .max_threads(2)
            .queue_capacity(Some(8))
            .saturation(SaturationPolicy::Discard)
            .thread_name_prefix("shed")
            .build()
            .unwrap(),
    )
    .unwrap();
    let executed = Arc::new(AtomicUsize::new(0));

    for _ in 0..500 {
        let executed = Arc::clone(&executed);
        pool.submit(Box::new(move || {
            executed.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(5));
        }))
        .unwrap();
    }

    thread::sleep(Duration::from_secs(2));
    let ran = executed.load(Ordering::Relaxed);
    assert!(ran > 0);
    assert!(ran < 500, "overflow should have been shed, ran {ran}");
}
