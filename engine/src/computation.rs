use std::thread;
use std::time::Instant;

use crate::{SaturationFactory, SaturationListener};

/// Runs a fixed pool of scoped workers over one factory.
pub struct ConcurrentSaturation;

impl ConcurrentSaturation {
    /// Spawns `workers` threads that each process jobs until none is left,
    /// then finish their engine.
    ///
    /// Returns `true` if the run stopped because the factory was interrupted.
    /// Clear the flag and call `run` again to complete the outstanding jobs.
    pub fn run<T, L>(factory: &SaturationFactory<T, L>, workers: usize) -> bool
    where
        T: Send + Sync,
        L: SaturationListener<T> + Sync,
    {
        let workers = workers.max(1);
        let started = Instant::now();
        tracing::debug!(
            "Saturating {} pending jobs with {workers} workers",
            factory.pending_jobs()
        );
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    let mut engine = factory.engine();
                    engine.process();
                    engine.finish();
                });
            }
        });
        let interrupted = factory.is_interrupted();
        let snapshot = factory.counters().snapshot();
        tracing::info!(
            "Saturation {} after {:?}: {} contexts created, {} jobs finished",
            if interrupted { "interrupted" } else { "done" },
            started.elapsed(),
            snapshot.contexts_created,
            snapshot.jobs_finished
        );
        interrupted
    }
}
