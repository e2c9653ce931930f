//! Counters collected by rule application engines.
//!
//! Each worker owns a [`RuleStatistics`] and merges it into the shared
//! aggregate when it finishes, so the hot path never touches shared state.

use std::time::{Duration, Instant};

use saturate_types::{ConclusionKind, RuleKind};

const CONCLUSION_KINDS: usize = ConclusionKind::ALL.len();
const RULE_KINDS: usize = RuleKind::ALL.len();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStatistics {
    produced: [u64; CONCLUSION_KINDS],
    processed: [u64; CONCLUSION_KINDS],
    /// Number of times a worker took a context from the active queue.
    contexts_processed: u64,
    rule_applications: [u64; RULE_KINDS],
    rule_time: [Duration; RULE_KINDS],
    decompositions: u64,
    decomposition_time: Duration,
}

impl RuleStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_produced(&mut self, kind: ConclusionKind) {
        self.produced[kind.index()] += 1;
    }

    pub(crate) fn record_processed(&mut self, kind: ConclusionKind) {
        self.processed[kind.index()] += 1;
    }

    pub(crate) fn record_context(&mut self) {
        self.contexts_processed += 1;
    }

    pub(crate) fn record_rule(&mut self, kind: RuleKind, started: Option<Instant>) {
        self.rule_applications[kind.index()] += 1;
        if let Some(started) = started {
            self.rule_time[kind.index()] += started.elapsed();
        }
    }

    pub(crate) fn record_decomposition(&mut self, started: Option<Instant>) {
        self.decompositions += 1;
        if let Some(started) = started {
            self.decomposition_time += started.elapsed();
        }
    }

    #[must_use]
    pub fn produced(&self, kind: ConclusionKind) -> u64 {
        self.produced[kind.index()]
    }

    #[must_use]
    pub fn processed(&self, kind: ConclusionKind) -> u64 {
        self.processed[kind.index()]
    }

    #[must_use]
    pub fn total_produced(&self) -> u64 {
        self.produced.iter().sum()
    }

    #[must_use]
    pub fn total_processed(&self) -> u64 {
        self.processed.iter().sum()
    }

    #[must_use]
    pub fn contexts_processed(&self) -> u64 {
        self.contexts_processed
    }

    #[must_use]
    pub fn rule_applications(&self, kind: RuleKind) -> u64 {
        self.rule_applications[kind.index()]
    }

    /// Zero unless rule timing was enabled.
    #[must_use]
    pub fn rule_time(&self, kind: RuleKind) -> Duration {
        self.rule_time[kind.index()]
    }

    #[must_use]
    pub fn decompositions(&self) -> u64 {
        self.decompositions
    }

    #[must_use]
    pub fn decomposition_time(&self) -> Duration {
        self.decomposition_time
    }

    pub fn merge(&mut self, other: &RuleStatistics) {
        for (total, part) in self.produced.iter_mut().zip(other.produced) {
            *total += part;
        }
        for (total, part) in self.processed.iter_mut().zip(other.processed) {
            *total += part;
        }
        for (total, part) in self
            .rule_applications
            .iter_mut()
            .zip(other.rule_applications)
        {
            *total += part;
        }
        for (total, part) in self.rule_time.iter_mut().zip(other.rule_time) {
            *total += part;
        }
        self.contexts_processed += other.contexts_processed;
        self.decompositions += other.decompositions;
        self.decomposition_time += other.decomposition_time;
    }

    /// Writes the non-zero counters at debug level.
    pub fn log(&self) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        tracing::debug!(
            "Contexts processed: {}, conclusions produced/processed: {}/{}",
            self.contexts_processed,
            self.total_produced(),
            self.total_processed()
        );
        for kind in ConclusionKind::ALL {
            let produced = self.produced(kind);
            if produced > 0 {
                tracing::debug!(
                    "  {}: produced {}, processed {}",
                    kind.as_str(),
                    produced,
                    self.processed(kind)
                );
            }
        }
        for kind in RuleKind::ALL {
            let applications = self.rule_applications(kind);
            if applications > 0 {
                tracing::debug!(
                    "  rule {}: {} applications, {:?}",
                    kind.as_str(),
                    applications,
                    self.rule_time(kind)
                );
            }
        }
        if self.decompositions > 0 {
            tracing::debug!(
                "  decomposition: {} applications, {:?}",
                self.decompositions,
                self.decomposition_time
            );
        }
    }
}
