//! Per-node saturation contexts.
//!
//! A context moves through `active → saturated` exactly once. While active,
//! its pending queue is drained by at most one worker at a time: a worker
//! must win the activation token before it may pop conclusions, and it hands
//! the token back through [`Context::deactivate`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};
use saturate_types::{Conclusion, DisjointnessId, NodeId, PropertyId};

#[derive(Debug)]
pub struct Context {
    root: NodeId,
    saturated: AtomicBool,
    inconsistent: AtomicBool,
    /// Activation token: `true` while the context sits in the active queue or
    /// is being drained.
    active: AtomicBool,
    todo: Mutex<VecDeque<Conclusion>>,
    derived: Mutex<Derived>,
}

impl Context {
    pub(crate) fn new(root: NodeId) -> Self {
        Self {
            root,
            saturated: AtomicBool::new(false),
            inconsistent: AtomicBool::new(false),
            active: AtomicBool::new(false),
            todo: Mutex::new(VecDeque::new()),
            derived: Mutex::new(Derived::default()),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.saturated.load(Ordering::Acquire)
    }

    /// `true` once a contradiction has been derived for the root.
    #[must_use]
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent.load(Ordering::Acquire)
    }

    /// Derived subsumers in id order.
    #[must_use]
    pub fn subsumers(&self) -> Vec<NodeId> {
        let mut subsumers = self.derived.lock().subsumers.clone();
        subsumers.sort_unstable();
        subsumers
    }

    #[must_use]
    pub fn has_subsumer(&self, node: NodeId) -> bool {
        self.derived.lock().subsumer_set.contains(&node)
    }

    /// `(relation, source)` pairs in sorted order.
    #[must_use]
    pub fn backward_links(&self) -> Vec<(PropertyId, NodeId)> {
        let derived = self.derived.lock();
        let mut links: Vec<_> = derived
            .backward_links
            .iter()
            .flat_map(|(&relation, sources)| sources.iter().map(move |&source| (relation, source)))
            .collect();
        links.sort_unstable();
        links
    }

    /// `(relation, target)` pairs in sorted order.
    #[must_use]
    pub fn forward_links(&self) -> Vec<(PropertyId, NodeId)> {
        let mut links: Vec<_> = self.derived.lock().forward_links.iter().copied().collect();
        links.sort_unstable();
        links
    }

    /// Number of conclusions waiting to be processed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.todo.lock().len()
    }

    pub(crate) fn push(&self, conclusion: Conclusion) {
        self.todo.lock().push_back(conclusion);
    }

    pub(crate) fn pop(&self) -> Option<Conclusion> {
        self.todo.lock().pop_front()
    }

    /// Tries to take the activation token.
    pub(crate) fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases the activation token after the queue was seen empty.
    ///
    /// Returns `true` if conclusions arrived in between and the caller took
    /// the token back; it must then keep draining.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.store(false, Ordering::Release);
        // A producer that pushed before the store saw the token taken and
        // relies on this check.
        !self.todo.lock().is_empty() && self.try_activate()
    }

    /// Returns `false` if the context was already saturated.
    pub(crate) fn mark_saturated(&self) -> bool {
        !self.saturated.swap(true, Ordering::AcqRel)
    }

    /// Returns `false` if the context was already inconsistent.
    pub(crate) fn mark_inconsistent(&self) -> bool {
        !self.inconsistent.swap(true, Ordering::AcqRel)
    }

    /// A copy of this idle context without backward links from sources
    /// outside `kept`, or `None` if every source is kept.
    ///
    /// The copy keeps the saturated and inconsistent flags.
    pub(crate) fn without_backward_sources(&self, kept: &HashSet<NodeId>) -> Option<Context> {
        let derived = self.derived.lock();
        if derived
            .all_backward_sources()
            .all(|source| kept.contains(&source))
        {
            return None;
        }
        let mut pruned = derived.clone();
        pruned.retain_backward_sources(|source| kept.contains(&source));
        Some(Self {
            root: self.root,
            saturated: AtomicBool::new(self.is_saturated()),
            inconsistent: AtomicBool::new(self.is_inconsistent()),
            active: AtomicBool::new(false),
            todo: Mutex::new(VecDeque::new()),
            derived: Mutex::new(pruned),
        })
    }

    /// Only the worker holding the activation token mutates the derived state.
    pub(crate) fn derived(&self) -> MutexGuard<'_, Derived> {
        self.derived.lock()
    }
}

/// Conclusions already processed in a context.
#[derive(Debug, Default, Clone)]
pub(crate) struct Derived {
    subsumers: Vec<NodeId>,
    subsumer_set: HashSet<NodeId>,
    backward_links: HashMap<PropertyId, Vec<NodeId>>,
    backward_link_set: HashSet<(PropertyId, NodeId)>,
    forward_links: HashSet<(PropertyId, NodeId)>,
    propagations: HashMap<PropertyId, Vec<NodeId>>,
    propagation_set: HashSet<(PropertyId, NodeId)>,
    disjoint_subsumers: HashMap<DisjointnessId, Vec<NodeId>>,
}

impl Derived {
    /// Returns `false` if `node` was already a subsumer.
    pub(crate) fn insert_subsumer(&mut self, node: NodeId) -> bool {
        if !self.subsumer_set.insert(node) {
            return false;
        }
        self.subsumers.push(node);
        true
    }

    pub(crate) fn has_subsumer(&self, node: NodeId) -> bool {
        self.subsumer_set.contains(&node)
    }

    pub(crate) fn insert_backward_link(&mut self, relation: PropertyId, source: NodeId) -> bool {
        if !self.backward_link_set.insert((relation, source)) {
            return false;
        }
        self.backward_links.entry(relation).or_default().push(source);
        true
    }

    pub(crate) fn backward_sources(&self, relation: PropertyId) -> &[NodeId] {
        self.backward_links.get(&relation).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn all_backward_sources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.backward_links.values().flatten().copied()
    }

    fn retain_backward_sources(&mut self, keep: impl Fn(NodeId) -> bool) {
        for sources in self.backward_links.values_mut() {
            sources.retain(|&source| keep(source));
        }
        self.backward_links.retain(|_, sources| !sources.is_empty());
        self.backward_link_set.retain(|&(_, source)| keep(source));
    }

    pub(crate) fn insert_forward_link(&mut self, relation: PropertyId, target: NodeId) -> bool {
        self.forward_links.insert((relation, target))
    }

    pub(crate) fn insert_propagation(&mut self, relation: PropertyId, carry: NodeId) -> bool {
        if !self.propagation_set.insert((relation, carry)) {
            return false;
        }
        self.propagations.entry(relation).or_default().push(carry);
        true
    }

    pub(crate) fn propagations(&self, relation: PropertyId) -> &[NodeId] {
        self.propagations.get(&relation).map_or(&[], Vec::as_slice)
    }

    /// Records `member` as a subsumer from `axiom`.
    ///
    /// Returns `true` if the context now holds two different members of the axiom.
    pub(crate) fn insert_disjoint_subsumer(
        &mut self,
        axiom: DisjointnessId,
        member: NodeId,
    ) -> bool {
        let members = self.disjoint_subsumers.entry(axiom).or_default();
        if !members.contains(&member) {
            members.push(member);
        }
        members.len() > 1
    }
}
