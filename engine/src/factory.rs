//! The saturation factory: many workers, many jobs, no barrier.
//!
//! Workers bracket every call into the rule engine with `workers_started`
//! and `workers_finished`. When a worker leaves the rule engine and sees
//! both counters equal, no conclusion is in flight anywhere, so every
//! context created and every job submitted before that point is complete.
//! The snapshots of `contexts_created` and `jobs_submitted` must be read
//! before `workers_started` for this to hold.
//!
//! Completed contexts and jobs are then finished one at a time by whichever
//! worker wins the CAS on the corresponding `*_finished` counter, which
//! keeps marking and listener notification exactly-once.
//!
//! Backpressure compares `contexts_created` with `contexts_processed`. Parked
//! workers are woken by the worker that advanced `contexts_processed`, once it
//! has marked the newly processed contexts saturated.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};
use saturate_config::SaturationConfig;
use saturate_core::{
    Interrupter, RuleApplicationEngine, RuleApplicationFactory, RuleStatistics, SaturationState,
};

use crate::counters::{SaturationCounters, update_if_smaller};
use crate::{JobStatistics, SaturationJob, SaturationListener};

pub struct SaturationFactory<T, L> {
    rules: RuleApplicationFactory,
    listener: L,
    threshold: usize,
    counters: SaturationCounters,
    jobs_to_do: Mutex<VecDeque<Arc<SaturationJob<T>>>>,
    /// Jobs handed to the rule engine, in `jobs_submitted` order.
    jobs_in_progress: Mutex<VecDeque<Arc<SaturationJob<T>>>>,
    workers_waiting: AtomicBool,
    parking: Mutex<()>,
    processed_advanced: Condvar,
    aggregated: Mutex<JobStatistics>,
}

impl<T, L: SaturationListener<T>> SaturationFactory<T, L> {
    #[must_use]
    pub fn new(state: Arc<SaturationState>, config: &SaturationConfig, listener: L) -> Self {
        Self::with_interrupter(state, config, listener, Interrupter::new())
    }

    /// Uses an interruption flag owned by the caller.
    ///
    /// Setting the flag through `interrupter` directly does not wake workers
    /// parked on the threshold; [`set_interrupt`](Self::set_interrupt) does.
    #[must_use]
    pub fn with_interrupter(
        state: Arc<SaturationState>,
        config: &SaturationConfig,
        listener: L,
        interrupter: Interrupter,
    ) -> Self {
        let rules = RuleApplicationFactory::new(state, interrupter)
            .with_rule_timings(config.statistics.rule_timings);
        Self {
            rules,
            listener,
            threshold: config.threshold(),
            counters: SaturationCounters::new(),
            jobs_to_do: Mutex::new(VecDeque::new()),
            jobs_in_progress: Mutex::new(VecDeque::new()),
            workers_waiting: AtomicBool::new(false),
            parking: Mutex::new(()),
            processed_advanced: Condvar::new(),
            aggregated: Mutex::new(JobStatistics::default()),
        }
    }

    /// A new engine for one worker. Call [`SaturationEngine::finish`] when done.
    pub fn engine(&self) -> SaturationEngine<'_, T, L> {
        SaturationEngine {
            factory: self,
            rules: self.rules.engine(&self.counters),
            stats: JobStatistics::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &Arc<SaturationState> {
        self.rules.state()
    }

    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Sets or clears the interruption flag.
    ///
    /// Setting it also wakes workers parked on the threshold so they can
    /// observe it and return.
    pub fn set_interrupt(&self, interrupt: bool) {
        self.rules.interrupter().set_interrupt(interrupt);
        if interrupt {
            self.wake_parked();
        }
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.rules.interrupter().is_interrupted()
    }

    #[must_use]
    pub fn counters(&self) -> &SaturationCounters {
        &self.counters
    }

    /// Job statistics merged from every finished engine.
    #[must_use]
    pub fn statistics(&self) -> JobStatistics {
        *self.aggregated.lock()
    }

    #[must_use]
    pub fn rule_statistics(&self) -> RuleStatistics {
        self.rules.statistics()
    }

    /// Maximum number of created but unprocessed contexts before new jobs wait.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of jobs not yet taken by any worker.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.jobs_to_do.lock().len()
    }

    pub fn print_statistics(&self) {
        self.rules.statistics().log();
        self.check_statistics();
        let stats = self.statistics();
        if stats.jobs_submitted > 0 {
            tracing::debug!(
                "Saturation jobs submitted=done+processed: {}={}+{}",
                stats.jobs_submitted,
                stats.jobs_already_done,
                stats.jobs_processed
            );
        }
        tracing::debug!("Locks: {}", stats.locks);
    }

    /// Checks that every submitted job was accounted for.
    ///
    /// Call after every engine finished and no job is left pending.
    pub fn finish(&self) {
        self.check_statistics();
    }

    fn check_statistics(&self) {
        let stats = self.statistics();
        if !stats.is_consistent() {
            tracing::error!(
                "Some submitted saturation jobs were not processed: {} submitted, {} already done, {} processed",
                stats.jobs_submitted,
                stats.jobs_already_done,
                stats.jobs_processed
            );
        }
    }

    /// Advances the processed counters if no worker is inside the rule engine.
    ///
    /// `finished_workers` is the value this worker just stored into
    /// `workers_finished`. Returns `true` if `contexts_processed` advanced.
    fn update_processed_counters(&self, finished_workers: usize) -> bool {
        let counters = &self.counters;
        if counters.last_interrupt_snapshot.load(Ordering::Acquire)
            >= counters.workers_started.load(Ordering::Acquire)
        {
            // No pass completed since the last interruption; pending work
            // may still sit in active contexts.
            return false;
        }
        let created = counters.contexts_created.load(Ordering::Acquire);
        let submitted = counters.jobs_submitted.load(Ordering::Acquire);
        if counters.workers_started.load(Ordering::Acquire) > finished_workers {
            return false;
        }
        update_if_smaller(&counters.jobs_processed, submitted);
        update_if_smaller(&counters.contexts_processed, created)
    }

    fn wake_parked(&self) {
        let _guard = self.parking.lock();
        self.workers_waiting.store(false, Ordering::SeqCst);
        self.processed_advanced.notify_all();
    }

    /// Marks processed contexts saturated and notifies processed jobs.
    fn process_finished_counters(&self, stats: &mut JobStatistics) {
        let counters = &self.counters;
        let state = self.state();
        loop {
            let finished = counters.contexts_finished.load(Ordering::Acquire);
            if finished == counters.contexts_processed.load(Ordering::Acquire) {
                break;
            }
            if counters
                .contexts_finished
                .compare_exchange(finished, finished + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                state.mark_next_context_saturated();
            }
        }
        loop {
            let finished = counters.jobs_finished.load(Ordering::Acquire);
            if finished == counters.jobs_processed.load(Ordering::Acquire) {
                break;
            }
            if counters
                .jobs_finished
                .compare_exchange(finished, finished + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                continue;
            }
            let Some(job) = self.jobs_in_progress.lock().pop_front() else {
                tracing::error!("Job counter advanced past the jobs in progress");
                break;
            };
            self.complete(&job, stats);
        }
    }

    fn complete(&self, job: &SaturationJob<T>, stats: &mut JobStatistics) {
        let root = job.root();
        let Some(context) = self.state().context(root) else {
            tracing::error!(
                "{}: finished job has no context",
                self.state().graph().display(root)
            );
            return;
        };
        stats.jobs_processed += 1;
        match job.set_output(context) {
            Ok(()) => {
                tracing::trace!("{}: saturation finished", self.state().graph().display(root));
                self.listener.notify_finished(job);
            }
            Err(err) => tracing::warn!("{err}"),
        }
    }
}

/// Per-worker handle on a [`SaturationFactory`].
pub struct SaturationEngine<'a, T, L> {
    factory: &'a SaturationFactory<T, L>,
    rules: RuleApplicationEngine<'a, SaturationCounters>,
    stats: JobStatistics,
}

impl<T, L: SaturationListener<T>> SaturationEngine<'_, T, L> {
    /// Queues `job`; never blocks and never runs rules.
    pub fn submit(&mut self, job: Arc<SaturationJob<T>>) {
        self.factory.jobs_to_do.lock().push_back(job);
        self.stats.jobs_submitted += 1;
    }

    /// Works on pending jobs until none is left or the run is interrupted.
    ///
    /// Blocks only while the number of unprocessed contexts is above the
    /// threshold.
    pub fn process(&mut self) {
        let factory = self.factory;
        let counters = &factory.counters;

        // Finish work left over by other workers or an interrupted run first.
        self.run_rules();

        loop {
            if factory.is_interrupted() {
                return;
            }
            let processed = counters.contexts_processed.load(Ordering::SeqCst);
            if counters.contexts_created().saturating_sub(processed) > factory.threshold {
                self.park(processed);
                continue;
            }
            let Some(job) = factory.jobs_to_do.lock().pop_front() else {
                return;
            };
            let root = job.root();
            if let Some(context) = factory.state().context(root)
                && context.is_saturated()
            {
                self.stats.jobs_already_done += 1;
                match job.set_output(context) {
                    Ok(()) => factory.listener.notify_finished(&job),
                    Err(err) => tracing::warn!("{err}"),
                }
                continue;
            }
            tracing::trace!("{}: saturation started", factory.state().graph().display(root));
            counters.workers_started.fetch_add(1, Ordering::AcqRel);
            factory.jobs_in_progress.lock().push_back(job);
            counters.jobs_submitted.fetch_add(1, Ordering::AcqRel);
            self.rules.submit(root);
            let interrupted = self.rules.process();
            self.leave_rules(interrupted);
        }
    }

    /// One pass of the rule engine over whatever is active, with counter upkeep.
    fn run_rules(&mut self) {
        self.factory
            .counters
            .workers_started
            .fetch_add(1, Ordering::AcqRel);
        let interrupted = self.rules.process();
        self.leave_rules(interrupted);
    }

    /// `interrupted` is what the rule pass returned; the shared flag may have
    /// been cleared since.
    fn leave_rules(&mut self, interrupted: bool) {
        let factory = self.factory;
        let counters = &factory.counters;
        if interrupted {
            update_if_smaller(
                &counters.last_interrupt_snapshot,
                counters.workers_started.load(Ordering::Acquire),
            );
        }
        let finished = counters.workers_finished.fetch_add(1, Ordering::AcqRel) + 1;
        let advanced = factory.update_processed_counters(finished);
        factory.process_finished_counters(&mut self.stats);
        if advanced && factory.workers_waiting.load(Ordering::SeqCst) {
            factory.wake_parked();
        }
    }

    /// Waits until `contexts_processed` moves past `processed` or the run is
    /// interrupted.
    fn park(&mut self, processed: usize) {
        let factory = self.factory;
        let mut guard = factory.parking.lock();
        factory.workers_waiting.store(true, Ordering::SeqCst);
        self.stats.locks += 1;
        if factory.counters.contexts_processed.load(Ordering::SeqCst) > processed {
            // Advanced before the flag was visible; nobody will notify.
            factory.workers_waiting.store(false, Ordering::SeqCst);
            factory.processed_advanced.notify_all();
            return;
        }
        if factory.is_interrupted() {
            return;
        }
        factory.processed_advanced.wait(&mut guard);
    }

    /// Merges this engine's statistics into the factory.
    pub fn finish(mut self) {
        self.rules.finish();
        self.factory.aggregated.lock().merge(&self.stats);
    }
}
