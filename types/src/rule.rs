//! Composition rules attached to indexed nodes.
//!
//! Each node owns one [`RuleChain`]: an ordered list holding at most one rule
//! per [`RuleKind`]. Rules are looked up, extended and removed by kind; the
//! accumulated state (told superclasses, conjunction partners, ...) lives in
//! the rule itself.

use serde::{Deserialize, Serialize};

use crate::{DisjointnessId, NodeId};

/// Discriminant of [`CompositionRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Deriving owl:Nothing yields a contradiction.
    Bottom,
    /// Deriving the node derives its told superclasses.
    SubClassOf,
    /// Deriving the node and a partner derives their conjunction.
    Conjunction,
    /// Deriving the node as a filler creates propagations of existentials.
    Propagation,
    /// Deriving the node records a disjoint-subsumer witness.
    Disjointness,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Bottom,
        RuleKind::SubClassOf,
        RuleKind::Conjunction,
        RuleKind::Propagation,
        RuleKind::Disjointness,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bottom => "owl:Nothing contradiction",
            Self::SubClassOf => "told subsumption",
            Self::Conjunction => "conjunction composition",
            Self::Propagation => "existential propagation",
            Self::Disjointness => "disjointness",
        }
    }
}

/// A conjunction `conjunction = this ⊓ partner` occurring on the left of an axiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConjunctionPartner {
    pub partner: NodeId,
    pub conjunction: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionRule {
    ContradictionOnBottom,
    /// A list rather than a set: removing one of two identical axioms must
    /// leave the other in place.
    ToldSubsumers {
        supers: Vec<NodeId>,
    },
    ConjunctionComposition {
        partners: Vec<ConjunctionPartner>,
    },
    /// Existentials `∃r.F` occurring on the left of an axiom whose filler `F`
    /// is the node this rule is attached to.
    ExistentialPropagation {
        existentials: Vec<NodeId>,
    },
    Disjointness {
        axioms: Vec<DisjointnessId>,
    },
}

impl CompositionRule {
    #[must_use]
    pub fn empty(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Bottom => Self::ContradictionOnBottom,
            RuleKind::SubClassOf => Self::ToldSubsumers { supers: Vec::new() },
            RuleKind::Conjunction => Self::ConjunctionComposition {
                partners: Vec::new(),
            },
            RuleKind::Propagation => Self::ExistentialPropagation {
                existentials: Vec::new(),
            },
            RuleKind::Disjointness => Self::Disjointness { axioms: Vec::new() },
        }
    }

    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::ContradictionOnBottom => RuleKind::Bottom,
            Self::ToldSubsumers { .. } => RuleKind::SubClassOf,
            Self::ConjunctionComposition { .. } => RuleKind::Conjunction,
            Self::ExistentialPropagation { .. } => RuleKind::Propagation,
            Self::Disjointness { .. } => RuleKind::Disjointness,
        }
    }

    /// `true` if this rule never derives anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ContradictionOnBottom => false,
            Self::ToldSubsumers { supers } => supers.is_empty(),
            Self::ConjunctionComposition { partners } => partners.is_empty(),
            Self::ExistentialPropagation { existentials } => existentials.is_empty(),
            Self::Disjointness { axioms } => axioms.is_empty(),
        }
    }
}

/// The ordered composition rules of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleChain {
    rules: Vec<CompositionRule>,
}

impl RuleChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositionRule> {
        self.rules.iter()
    }

    fn position(&self, kind: RuleKind) -> Option<usize> {
        self.rules.iter().position(|rule| rule.kind() == kind)
    }

    #[must_use]
    pub fn find(&self, kind: RuleKind) -> Option<&CompositionRule> {
        self.rules.iter().find(|rule| rule.kind() == kind)
    }

    pub fn find_mut(&mut self, kind: RuleKind) -> Option<&mut CompositionRule> {
        self.rules.iter_mut().find(|rule| rule.kind() == kind)
    }

    /// Returns the rule of `kind`, appending an empty one if the chain has none.
    pub fn get_or_insert(&mut self, kind: RuleKind) -> &mut CompositionRule {
        let position = match self.position(kind) {
            Some(position) => position,
            None => {
                self.rules.push(CompositionRule::empty(kind));
                self.rules.len() - 1
            }
        };
        &mut self.rules[position]
    }

    pub fn remove(&mut self, kind: RuleKind) -> Option<CompositionRule> {
        let position = self.position(kind)?;
        Some(self.rules.remove(position))
    }

    /// Drops the rule of `kind` if it no longer derives anything.
    fn prune(&mut self, kind: RuleKind) {
        if self.find(kind).is_some_and(CompositionRule::is_empty) {
            self.remove(kind);
        }
    }

    pub fn add_told_subsumer(&mut self, sup: NodeId) {
        if let CompositionRule::ToldSubsumers { supers } = self.get_or_insert(RuleKind::SubClassOf)
        {
            supers.push(sup);
        }
    }

    /// Removes one occurrence of `sup`. Returns `false` if there was none.
    pub fn remove_told_subsumer(&mut self, sup: NodeId) -> bool {
        let removed = match self.find_mut(RuleKind::SubClassOf) {
            Some(CompositionRule::ToldSubsumers { supers }) => {
                match supers.iter().position(|&told| told == sup) {
                    Some(position) => {
                        supers.remove(position);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        self.prune(RuleKind::SubClassOf);
        removed
    }

    pub fn add_conjunction(&mut self, entry: ConjunctionPartner) {
        if let CompositionRule::ConjunctionComposition { partners } =
            self.get_or_insert(RuleKind::Conjunction)
            && !partners.contains(&entry)
        {
            partners.push(entry);
        }
    }

    pub fn remove_conjunction(&mut self, entry: ConjunctionPartner) {
        if let Some(CompositionRule::ConjunctionComposition { partners }) =
            self.find_mut(RuleKind::Conjunction)
        {
            partners.retain(|existing| *existing != entry);
        }
        self.prune(RuleKind::Conjunction);
    }

    pub fn add_propagation(&mut self, existential: NodeId) {
        if let CompositionRule::ExistentialPropagation { existentials } =
            self.get_or_insert(RuleKind::Propagation)
            && !existentials.contains(&existential)
        {
            existentials.push(existential);
        }
    }

    pub fn remove_propagation(&mut self, existential: NodeId) {
        if let Some(CompositionRule::ExistentialPropagation { existentials }) =
            self.find_mut(RuleKind::Propagation)
        {
            existentials.retain(|existing| *existing != existential);
        }
        self.prune(RuleKind::Propagation);
    }

    pub fn add_disjointness(&mut self, axiom: DisjointnessId) {
        if let CompositionRule::Disjointness { axioms } = self.get_or_insert(RuleKind::Disjointness)
            && !axioms.contains(&axiom)
        {
            axioms.push(axiom);
        }
    }
}
