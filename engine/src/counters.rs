//! Monotone counters driving completion detection.
//!
//! All counters only grow for the lifetime of one factory. Increments use
//! `AcqRel` and plain reads use `Acquire`, so a worker that observes an
//! increment also observes everything its author did before it. Advancing a
//! counter to a snapshot goes through [`update_if_smaller`], which is
//! `SeqCst` because the backpressure handshake pairs it with the
//! workers-waiting flag.

use std::sync::atomic::{AtomicUsize, Ordering};

use saturate_core::{Context, ContextCreationListener};

#[derive(Debug, Default)]
pub struct SaturationCounters {
    pub(crate) contexts_created: AtomicUsize,
    /// Contexts known to be fully processed, in creation order.
    pub(crate) contexts_processed: AtomicUsize,
    /// Contexts marked saturated.
    pub(crate) contexts_finished: AtomicUsize,
    /// Jobs handed to the rule engine (already-done jobs excluded).
    pub(crate) jobs_submitted: AtomicUsize,
    pub(crate) jobs_processed: AtomicUsize,
    /// Jobs whose listener was notified.
    pub(crate) jobs_finished: AtomicUsize,
    pub(crate) workers_started: AtomicUsize,
    pub(crate) workers_finished: AtomicUsize,
    /// Value of `workers_started` seen by the latest interrupted pass.
    pub(crate) last_interrupt_snapshot: AtomicUsize,
}

/// Plain copy of the counters.
///
/// Taken finished-first, so `created ≥ processed ≥ finished` holds within one
/// snapshot for both contexts and jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub contexts_created: usize,
    pub contexts_processed: usize,
    pub contexts_finished: usize,
    pub jobs_submitted: usize,
    pub jobs_processed: usize,
    pub jobs_finished: usize,
    pub workers_started: usize,
    pub workers_finished: usize,
    pub last_interrupt_snapshot: usize,
}

impl SaturationCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let contexts_finished = self.contexts_finished.load(Ordering::Acquire);
        let contexts_processed = self.contexts_processed.load(Ordering::Acquire);
        let contexts_created = self.contexts_created.load(Ordering::Acquire);
        let jobs_finished = self.jobs_finished.load(Ordering::Acquire);
        let jobs_processed = self.jobs_processed.load(Ordering::Acquire);
        let jobs_submitted = self.jobs_submitted.load(Ordering::Acquire);
        let workers_finished = self.workers_finished.load(Ordering::Acquire);
        let workers_started = self.workers_started.load(Ordering::Acquire);
        CounterSnapshot {
            contexts_created,
            contexts_processed,
            contexts_finished,
            jobs_submitted,
            jobs_processed,
            jobs_finished,
            workers_started,
            workers_finished,
            last_interrupt_snapshot: self.last_interrupt_snapshot.load(Ordering::Acquire),
        }
    }

    #[must_use]
    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn contexts_processed(&self) -> usize {
        self.contexts_processed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn jobs_finished(&self) -> usize {
        self.jobs_finished.load(Ordering::Acquire)
    }
}

impl ContextCreationListener for SaturationCounters {
    fn notify_context_creation(&self, _context: &Context) {
        self.contexts_created.fetch_add(1, Ordering::AcqRel);
    }
}

/// Raises `counter` to `value` unless it is already at least `value`.
///
/// Returns `true` if this call changed the counter.
pub fn update_if_smaller(counter: &AtomicUsize, value: usize) -> bool {
    let mut current = counter.load(Ordering::SeqCst);
    loop {
        if current >= value {
            return false;
        }
        match counter.compare_exchange_weak(current, value, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return true,
            Err(actual) => current = actual,
        }
    }
}
