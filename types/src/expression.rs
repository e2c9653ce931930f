use serde::{Deserialize, Serialize};

use crate::{NodeId, PropertyId, RuleChain};

/// The structure of an interned class expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexedExpression {
    Class { name: String },
    /// owl:Thing
    Top,
    /// owl:Nothing
    Bottom,
    /// Conjuncts are stored in id order so `A ⊓ B` and `B ⊓ A` intern to one node.
    Intersection { first: NodeId, second: NodeId },
    Existential { property: PropertyId, filler: NodeId },
}

impl IndexedExpression {
    #[must_use]
    pub fn intersection(a: NodeId, b: NodeId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self::Intersection { first, second }
    }
}

/// A node of the graph: its expression plus the composition rules attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedNode {
    expression: IndexedExpression,
    rules: RuleChain,
    /// Number of registered axioms in which this node occurs on the left.
    negative_occurrences: u32,
}

impl IndexedNode {
    pub(crate) fn new(expression: IndexedExpression) -> Self {
        Self {
            expression,
            rules: RuleChain::new(),
            negative_occurrences: 0,
        }
    }

    #[must_use]
    pub fn expression(&self) -> &IndexedExpression {
        &self.expression
    }

    #[must_use]
    pub fn rules(&self) -> &RuleChain {
        &self.rules
    }

    pub(crate) fn rules_mut(&mut self) -> &mut RuleChain {
        &mut self.rules
    }

    #[must_use]
    pub fn negative_occurrences(&self) -> u32 {
        self.negative_occurrences
    }

    /// Returns the new count.
    pub(crate) fn increment_negative(&mut self) -> u32 {
        self.negative_occurrences += 1;
        self.negative_occurrences
    }

    /// Returns the new count.
    pub(crate) fn decrement_negative(&mut self) -> u32 {
        self.negative_occurrences = self.negative_occurrences.saturating_sub(1);
        self.negative_occurrences
    }
}

/// An object property with its reflexive-transitive hierarchy closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedProperty {
    name: String,
    super_properties: Vec<PropertyId>,
    sub_properties: Vec<PropertyId>,
}

impl IndexedProperty {
    pub(crate) fn new(id: PropertyId, name: String) -> Self {
        Self {
            name,
            super_properties: vec![id],
            sub_properties: vec![id],
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All `r` with `self ⊑ r`, including `self`, in id order.
    #[must_use]
    pub fn super_properties(&self) -> &[PropertyId] {
        &self.super_properties
    }

    /// All `s` with `s ⊑ self`, including `self`, in id order.
    #[must_use]
    pub fn sub_properties(&self) -> &[PropertyId] {
        &self.sub_properties
    }

    pub(crate) fn set_closure(&mut self, supers: Vec<PropertyId>, subs: Vec<PropertyId>) {
        self.super_properties = supers;
        self.sub_properties = subs;
    }
}

/// `DisjointClasses(members...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisjointnessAxiom {
    members: Vec<NodeId>,
}

impl DisjointnessAxiom {
    pub(crate) fn new(members: Vec<NodeId>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// A member listed more than once is disjoint with itself.
    #[must_use]
    pub fn is_self_disjoint(&self, member: NodeId) -> bool {
        self.members.iter().filter(|&&m| m == member).count() > 1
    }
}
