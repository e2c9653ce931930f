//! The node → context map shared by all workers of a run.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use saturate_types::{Conclusion, NodeId, OntologyGraph};

use crate::Context;

#[derive(Debug)]
pub struct SaturationState {
    graph: Arc<OntologyGraph>,
    contexts: DashMap<NodeId, Arc<Context>>,
    /// Contexts holding the activation token and waiting for a worker.
    active: Mutex<VecDeque<Arc<Context>>>,
    /// Created contexts not yet marked saturated, in creation order.
    not_saturated: Mutex<VecDeque<Arc<Context>>>,
}

impl SaturationState {
    #[must_use]
    pub fn new(graph: Arc<OntologyGraph>) -> Self {
        Self {
            graph,
            contexts: DashMap::new(),
            active: Mutex::new(VecDeque::new()),
            not_saturated: Mutex::new(VecDeque::new()),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    #[must_use]
    pub fn context(&self, root: NodeId) -> Option<Arc<Context>> {
        self.contexts.get(&root).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of contexts created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Number of created contexts not yet marked saturated.
    #[must_use]
    pub fn unsaturated(&self) -> usize {
        self.not_saturated.lock().len()
    }

    /// Returns the context for `root` and whether this call created it.
    ///
    /// A new context is queued for saturation marking before this returns, so
    /// a caller counting creations never counts ahead of the queue.
    pub fn get_or_create(&self, root: NodeId) -> (Arc<Context>, bool) {
        let (context, created) = match self.contexts.entry(root) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let context = Arc::new(Context::new(root));
                entry.insert(Arc::clone(&context));
                (context, true)
            }
        };
        if created {
            self.not_saturated.lock().push_back(Arc::clone(&context));
        }
        (context, created)
    }

    /// Enqueues `conclusion` in `context`, activating the context if needed.
    pub fn produce(&self, context: &Arc<Context>, conclusion: Conclusion) {
        context.push(conclusion);
        if context.try_activate() {
            self.active.lock().push_back(Arc::clone(context));
        }
    }

    pub(crate) fn take_active(&self) -> Option<Arc<Context>> {
        self.active.lock().pop_front()
    }

    /// Number of contexts waiting in the active queue.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.lock().len()
    }

    /// Marks the oldest unsaturated context as saturated.
    ///
    /// Only valid once every conclusion of that context has been processed;
    /// the orchestrator calls this exactly once per counted context.
    pub fn mark_next_context_saturated(&self) -> Option<Arc<Context>> {
        let next = self.not_saturated.lock().pop_front();
        match next {
            Some(context) => {
                if context.mark_saturated() {
                    tracing::trace!("{}: context saturated", self.graph.display(context.root()));
                } else {
                    tracing::error!(
                        "{}: context was already marked saturated",
                        self.graph.display(context.root())
                    );
                }
                Some(context)
            }
            None => {
                tracing::error!("No unsaturated context left to mark saturated");
                None
            }
        }
    }

    /// Builds the state for re-saturating after the rule chains of some roots changed.
    ///
    /// Saturated contexts are carried over unless their root is in
    /// `invalidated`; everything else starts over. `invalidated` must contain
    /// every root whose closure depends on a changed chain, including roots
    /// that link into changed contexts. Must not be called while workers are
    /// processing this state.
    ///
    /// A carried context holding backward links from a root that starts over
    /// is replaced by a copy without those links, so the new context of that
    /// root receives the propagations again. Other carried contexts are
    /// shared with this state.
    #[must_use]
    pub fn resubmission_state(
        &self,
        graph: Arc<OntologyGraph>,
        invalidated: impl IntoIterator<Item = NodeId>,
    ) -> SaturationState {
        let invalidated: HashSet<NodeId> = invalidated.into_iter().collect();
        let kept: HashSet<NodeId> = self
            .contexts
            .iter()
            .filter(|entry| entry.value().is_saturated() && !invalidated.contains(entry.key()))
            .map(|entry| *entry.key())
            .collect();
        let next = SaturationState::new(graph);
        let mut copied = 0;
        for &root in &kept {
            let Some(context) = self.context(root) else {
                continue;
            };
            let carried = match context.without_backward_sources(&kept) {
                Some(copy) => {
                    copied += 1;
                    Arc::new(copy)
                }
                None => context,
            };
            next.contexts.insert(root, carried);
        }
        tracing::debug!(
            "Re-saturation keeps {} of {} contexts ({} invalidated roots, {} copied)",
            next.contexts.len(),
            self.contexts.len(),
            invalidated.len(),
            copied
        );
        next
    }
}
