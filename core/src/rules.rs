//! Application of rules to processed conclusions.
//!
//! Dispatch is a match over the conclusion variant, then (for subsumers) over
//! the expression variant for decomposition and over the node's rule chain
//! for composition.

use std::sync::Arc;
use std::time::Instant;

use saturate_types::{
    CompositionRule, Conclusion, DisjointnessId, IndexedExpression, NodeId, PropertyId,
    SubsumerOrigin,
};

use crate::engine::ContextCreationListener;
use crate::{Context, RuleStatistics, SaturationState};

/// Produces conclusions on behalf of one worker.
pub(crate) struct Writer<'a, L: ?Sized> {
    pub(crate) state: &'a SaturationState,
    pub(crate) listener: &'a L,
    pub(crate) stats: &'a mut RuleStatistics,
    pub(crate) timings: bool,
}

impl<L: ContextCreationListener + ?Sized> Writer<'_, L> {
    pub(crate) fn produce(&mut self, context: &Arc<Context>, conclusion: Conclusion) {
        self.stats.record_produced(conclusion.kind());
        self.state.produce(context, conclusion);
    }

    /// Returns the context for `root`, initializing it if this call created it.
    pub(crate) fn get_or_create(&mut self, root: NodeId) -> Arc<Context> {
        let (context, created) = self.state.get_or_create(root);
        if created {
            self.initialize(&context);
            self.listener.notify_context_creation(&context);
        }
        context
    }

    fn initialize(&mut self, context: &Arc<Context>) {
        let root = context.root();
        self.produce(context, Conclusion::plain(root));
        let state = self.state;
        let graph = state.graph();
        let top = graph.top();
        if root != top && graph.rules(top).is_some_and(|rules| !rules.is_empty()) {
            self.produce(context, Conclusion::plain(top));
        }
    }

    fn clock(&self) -> Option<Instant> {
        self.timings.then(Instant::now)
    }

    /// Processes one conclusion taken from the queue of `context`.
    pub(crate) fn apply(&mut self, context: &Arc<Context>, conclusion: Conclusion) {
        self.stats.record_processed(conclusion.kind());
        if context.is_inconsistent() {
            if let Conclusion::BackwardLink { source, relation } = conclusion {
                let fresh = context.derived().insert_backward_link(relation, source);
                if fresh {
                    let source = self.get_or_create(source);
                    self.produce(&source, Conclusion::Contradiction);
                }
            }
            return;
        }
        match conclusion {
            Conclusion::Subsumer { expression, origin } => {
                self.apply_subsumer(context, expression, origin);
            }
            Conclusion::ForwardLink { relation, target } => {
                context.derived().insert_forward_link(relation, target);
            }
            Conclusion::BackwardLink { source, relation } => {
                self.apply_backward_link(context, source, relation);
            }
            Conclusion::Propagation { relation, carry } => {
                self.apply_propagation(context, relation, carry);
            }
            Conclusion::Contradiction => self.apply_contradiction(context),
            Conclusion::DisjointSubsumer { axiom, member } => {
                self.apply_disjoint_subsumer(context, axiom, member);
            }
        }
    }

    fn apply_subsumer(&mut self, context: &Arc<Context>, expression: NodeId, origin: SubsumerOrigin) {
        if !context.derived().insert_subsumer(expression) {
            return;
        }
        if origin == SubsumerOrigin::Plain {
            self.decompose(context, expression);
        }
        self.compose(context, expression);
    }

    fn decompose(&mut self, context: &Arc<Context>, expression: NodeId) {
        let started = self.clock();
        let state = self.state;
        match state.graph().expression(expression) {
            Some(&IndexedExpression::Intersection { first, second }) => {
                self.produce(context, Conclusion::plain(first));
                self.produce(context, Conclusion::plain(second));
            }
            Some(&IndexedExpression::Existential { property, filler }) => {
                let target = self.get_or_create(filler);
                self.produce(
                    &target,
                    Conclusion::BackwardLink {
                        source: context.root(),
                        relation: property,
                    },
                );
                self.produce(
                    context,
                    Conclusion::ForwardLink {
                        relation: property,
                        target: filler,
                    },
                );
            }
            Some(
                IndexedExpression::Class { .. } | IndexedExpression::Top | IndexedExpression::Bottom,
            )
            | None => return,
        }
        self.stats.record_decomposition(started);
    }

    fn compose(&mut self, context: &Arc<Context>, expression: NodeId) {
        let state = self.state;
        let Some(rules) = state.graph().rules(expression) else {
            return;
        };
        for rule in rules.iter() {
            let started = self.clock();
            match rule {
                CompositionRule::ContradictionOnBottom => {
                    self.produce(context, Conclusion::Contradiction);
                }
                CompositionRule::ToldSubsumers { supers } => {
                    for &sup in supers {
                        self.produce(context, Conclusion::plain(sup));
                    }
                }
                CompositionRule::ConjunctionComposition { partners } => {
                    let ready: Vec<NodeId> = {
                        let derived = context.derived();
                        partners
                            .iter()
                            .filter(|entry| derived.has_subsumer(entry.partner))
                            .map(|entry| entry.conjunction)
                            .collect()
                    };
                    for conjunction in ready {
                        self.produce(context, Conclusion::composed(conjunction));
                    }
                }
                CompositionRule::ExistentialPropagation { existentials } => {
                    for &existential in existentials {
                        if let Some(&IndexedExpression::Existential { property, .. }) =
                            state.graph().expression(existential)
                        {
                            self.produce(
                                context,
                                Conclusion::Propagation {
                                    relation: property,
                                    carry: existential,
                                },
                            );
                        }
                    }
                }
                CompositionRule::Disjointness { axioms } => {
                    for &axiom in axioms {
                        self.produce(
                            context,
                            Conclusion::DisjointSubsumer {
                                axiom,
                                member: expression,
                            },
                        );
                    }
                }
            }
            self.stats.record_rule(rule.kind(), started);
        }
    }

    /// Propagates every existential whose relation is a super-relation of `relation`.
    fn apply_backward_link(&mut self, context: &Arc<Context>, source: NodeId, relation: PropertyId) {
        let carried: Vec<NodeId> = {
            let mut derived = context.derived();
            if !derived.insert_backward_link(relation, source) {
                return;
            }
            let supers = self
                .state
                .graph()
                .property_info(relation)
                .map_or(&[][..], |info| info.super_properties());
            supers
                .iter()
                .flat_map(|&sup| derived.propagations(sup).iter().copied())
                .collect()
        };
        if carried.is_empty() {
            return;
        }
        let source = self.get_or_create(source);
        for carry in carried {
            self.produce(&source, Conclusion::composed(carry));
        }
    }

    /// Sends `carry` to every source linked by a sub-relation of `relation`.
    fn apply_propagation(&mut self, context: &Arc<Context>, relation: PropertyId, carry: NodeId) {
        let sources: Vec<NodeId> = {
            let mut derived = context.derived();
            if !derived.insert_propagation(relation, carry) {
                return;
            }
            let subs = self
                .state
                .graph()
                .property_info(relation)
                .map_or(&[][..], |info| info.sub_properties());
            subs.iter()
                .flat_map(|&sub| derived.backward_sources(sub).iter().copied())
                .collect()
        };
        for source in sources {
            let source = self.get_or_create(source);
            self.produce(&source, Conclusion::composed(carry));
        }
    }

    fn apply_contradiction(&mut self, context: &Arc<Context>) {
        if !context.mark_inconsistent() {
            return;
        }
        tracing::trace!("{}: inconsistent", self.state.graph().display(context.root()));
        let sources: Vec<NodeId> = context.derived().all_backward_sources().collect();
        for source in sources {
            let source = self.get_or_create(source);
            self.produce(&source, Conclusion::Contradiction);
        }
    }

    fn apply_disjoint_subsumer(
        &mut self,
        context: &Arc<Context>,
        axiom: DisjointnessId,
        member: NodeId,
    ) {
        let clash = context.derived().insert_disjoint_subsumer(axiom, member);
        let self_disjoint = self
            .state
            .graph()
            .disjointness_axiom(axiom)
            .is_some_and(|axiom| axiom.is_self_disjoint(member));
        if clash || self_disjoint {
            self.produce(context, Conclusion::Contradiction);
        }
    }
}
