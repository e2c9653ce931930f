//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use saturate_config::SaturationConfig;
use saturate_core::SaturationState;
use saturate_engine::{
    ConcurrentSaturation, CounterSnapshot, JobStatistics, SaturationFactory, SaturationJob,
    SaturationListener,
};
use saturate_types::{NodeId, OntologyGraph};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config(workers: usize) -> SaturationConfig {
    SaturationConfig {
        workers,
        ..SaturationConfig::default()
    }
}

pub fn new_state(graph: OntologyGraph) -> Arc<SaturationState> {
    Arc::new(SaturationState::new(Arc::new(graph)))
}

/// Submits one job per root through a short-lived engine; payloads are indices.
pub fn submit_all<L>(
    factory: &SaturationFactory<usize, L>,
    roots: &[NodeId],
) -> Vec<Arc<SaturationJob<usize>>>
where
    L: SaturationListener<usize>,
{
    let mut engine = factory.engine();
    let jobs = roots
        .iter()
        .enumerate()
        .map(|(index, &root)| {
            let job = Arc::new(SaturationJob::new(root, index));
            engine.submit(Arc::clone(&job));
            job
        })
        .collect();
    engine.finish();
    jobs
}

/// Outcome of a complete, uninterrupted run.
pub struct Run {
    pub state: Arc<SaturationState>,
    pub jobs: Vec<Arc<SaturationJob<usize>>>,
    /// Payloads in notification order.
    pub notified: Vec<usize>,
    pub statistics: JobStatistics,
    pub snapshot: CounterSnapshot,
}

impl Run {
    pub fn subsumers(&self, root: NodeId) -> Vec<NodeId> {
        self.state
            .context(root)
            .map(|context| context.subsumers())
            .unwrap_or_default()
    }

    pub fn is_inconsistent(&self, root: NodeId) -> bool {
        self.state
            .context(root)
            .is_some_and(|context| context.is_inconsistent())
    }
}

pub fn saturate(graph: OntologyGraph, roots: &[NodeId], workers: usize) -> Run {
    saturate_state(new_state(graph), roots, workers)
}

pub fn saturate_state(state: Arc<SaturationState>, roots: &[NodeId], workers: usize) -> Run {
    init_tracing();
    let notified = Mutex::new(Vec::new());
    let listener = |job: &SaturationJob<usize>| notified.lock().push(*job.payload());
    let factory = SaturationFactory::new(Arc::clone(&state), &config(workers), &listener);
    let jobs = submit_all(&factory, roots);
    let interrupted = ConcurrentSaturation::run(&factory, workers);
    assert!(!interrupted, "unexpected interruption");
    factory.finish();
    let statistics = factory.statistics();
    let snapshot = factory.counters().snapshot();
    drop(factory);
    Run {
        state,
        jobs,
        notified: notified.into_inner(),
        statistics,
        snapshot,
    }
}

/// `A ⊑ B`, `B ⊑ C`.
pub fn told_chain() -> (OntologyGraph, [NodeId; 3]) {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let c = graph.class("C");
    graph.subclass_of(a, b).unwrap();
    graph.subclass_of(b, c).unwrap();
    (graph, [a, b, c])
}

/// `DisjointClasses(B, D)`, `Root ⊑ B`, `Root ⊑ D`.
pub fn disjoint_root() -> (OntologyGraph, NodeId) {
    let mut graph = OntologyGraph::new();
    let root = graph.class("Root");
    let b = graph.class("B");
    let d = graph.class("D");
    graph.disjoint_classes(&[b, d]).unwrap();
    graph.subclass_of(root, b).unwrap();
    graph.subclass_of(root, d).unwrap();
    (graph, root)
}

/// A small ontology exercising existentials, propagation and conjunctions:
///
/// ```text
/// A ⊑ ∃hasPart.B
/// B ⊑ C
/// ∃hasPart.C ⊑ D
/// A ⊓ D ⊑ E
/// ```
pub fn parts_ontology() -> (OntologyGraph, NodeId) {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let c = graph.class("C");
    let d = graph.class("D");
    let e = graph.class("E");
    let has_part = graph.property("hasPart");
    let some_b = graph.existential(has_part, b).unwrap();
    let some_c = graph.existential(has_part, c).unwrap();
    let a_and_d = graph.intersection(a, d).unwrap();
    graph.subclass_of(a, some_b).unwrap();
    graph.subclass_of(b, c).unwrap();
    graph.subclass_of(some_c, d).unwrap();
    graph.subclass_of(a_and_d, e).unwrap();
    (graph, a)
}

/// `count` independent classes with no axioms; each job creates one context.
pub fn flat_classes(count: usize) -> (OntologyGraph, Vec<NodeId>) {
    let mut graph = OntologyGraph::new();
    let roots = (0..count)
        .map(|index| graph.class(format!("C{index}")))
        .collect();
    (graph, roots)
}

/// A `length`-long told chain `C0 ⊑ C1 ⊑ ... ⊑ Cn`, with every class linking to
/// the next through `∃r`.
pub fn linked_chain(length: usize) -> (OntologyGraph, Vec<NodeId>) {
    let mut graph = OntologyGraph::new();
    let r = graph.property("r");
    let roots: Vec<NodeId> = (0..length)
        .map(|index| graph.class(format!("C{index}")))
        .collect();
    for pair in roots.windows(2) {
        graph.subclass_of(pair[0], pair[1]).unwrap();
        let link = graph.existential(r, pair[1]).unwrap();
        graph.subclass_of(pair[0], link).unwrap();
    }
    (graph, roots)
}
