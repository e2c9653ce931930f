//! Interruption and resumption

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use saturate_config::{SaturationConfig, ThresholdConfig};
use saturate_core::Interrupter;
use saturate_engine::{ConcurrentSaturation, SaturationFactory, SaturationJob};

use crate::common::{config, flat_classes, init_tracing, linked_chain, new_state, submit_all};

fn counters(len: usize) -> Vec<AtomicUsize> {
    (0..len).map(|_| AtomicUsize::new(0)).collect()
}

fn assert_each_once(counts: &[AtomicUsize]) {
    for (index, count) in counts.iter().enumerate() {
        assert_eq!(count.load(Ordering::Relaxed), 1, "job {index}");
    }
}

#[test]
fn listener_interrupt_stops_single_worker() {
    init_tracing();
    let (graph, roots) = linked_chain(30);
    let interrupter = Interrupter::new();
    let trip = interrupter.clone();
    let armed = AtomicBool::new(true);
    let counts = counters(roots.len());
    let listener = |job: &SaturationJob<usize>| {
        counts[*job.payload()].fetch_add(1, Ordering::Relaxed);
        if armed.swap(false, Ordering::Relaxed) {
            trip.set_interrupt(true);
        }
    };
    let factory =
        SaturationFactory::with_interrupter(new_state(graph), &config(1), &listener, interrupter);
    let jobs = submit_all(&factory, &roots);

    assert!(ConcurrentSaturation::run(&factory, 1));
    assert_eq!(factory.counters().jobs_finished(), 1);
    assert!(jobs[0].is_finished());
    assert!(!jobs[1].is_finished());
    assert_eq!(factory.pending_jobs(), roots.len() - 1);

    factory.set_interrupt(false);
    assert!(!ConcurrentSaturation::run(&factory, 4));
    factory.finish();

    assert_each_once(&counts);
    let stats = factory.statistics();
    assert_eq!(stats.jobs_processed(), 1);
    assert_eq!(stats.jobs_already_done(), roots.len() as u64 - 1);
}

#[test]
fn interrupt_during_concurrent_passes_resumes() {
    init_tracing();
    let (graph, roots) = flat_classes(400);
    let interrupter = Interrupter::new();
    let trip = interrupter.clone();
    let seen = AtomicUsize::new(0);
    let counts = counters(roots.len());
    let listener = |job: &SaturationJob<usize>| {
        counts[*job.payload()].fetch_add(1, Ordering::Relaxed);
        if seen.fetch_add(1, Ordering::Relaxed) == 20 {
            trip.set_interrupt(true);
        }
    };
    let factory =
        SaturationFactory::with_interrupter(new_state(graph), &config(4), &listener, interrupter);
    let jobs = submit_all(&factory, &roots);

    assert!(ConcurrentSaturation::run(&factory, 4));
    assert!(jobs.iter().any(|job| !job.is_finished()));

    factory.set_interrupt(false);
    assert!(!ConcurrentSaturation::run(&factory, 4));
    factory.finish();

    assert_each_once(&counts);
    assert!(jobs.iter().all(|job| job.is_finished()));
    assert!(factory.statistics().is_consistent());
    let snapshot = factory.counters().snapshot();
    assert_eq!(snapshot.contexts_finished, snapshot.contexts_created);
}

#[test]
fn interrupt_wakes_parked_workers() {
    const WORKERS: usize = 4;
    init_tracing();
    let (graph, roots) = flat_classes(2000);
    let config = SaturationConfig {
        workers: WORKERS,
        threshold: ThresholdConfig {
            base: 0,
            per_worker: 0,
        },
        ..SaturationConfig::default()
    };
    let counts = counters(roots.len());
    let listener = |job: &SaturationJob<usize>| {
        counts[*job.payload()].fetch_add(1, Ordering::Relaxed);
    };
    let factory = SaturationFactory::new(new_state(graph), &config, &listener);
    submit_all(&factory, &roots);

    std::thread::scope(|scope| {
        let worker = scope.spawn(|| ConcurrentSaturation::run(&factory, WORKERS));
        while factory.counters().jobs_finished() < 10 && !worker.is_finished() {
            std::thread::yield_now();
        }
        factory.set_interrupt(true);
    });

    factory.set_interrupt(false);
    assert!(!ConcurrentSaturation::run(&factory, WORKERS));
    factory.finish();

    assert_each_once(&counts);
    assert!(factory.statistics().is_consistent());
}
