//! Conclusions derived during saturation.
//!
//! Every conclusion is stored in (or queued for) exactly one context. The
//! premise references carried by each variant are the ones the consuming rule
//! needs; nothing else is recorded here.

use serde::{Deserialize, Serialize};

use crate::{DisjointnessId, NodeId, PropertyId};

/// How a subsumer was obtained.
///
/// Plain subsumers come from told axioms, context initialization, or
/// decomposition and still need to be decomposed. Composed subsumers are built
/// from parts the context already holds, so only composition rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsumerOrigin {
    Plain,
    Composed,
}

/// A derived fact about the root of the context it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conclusion {
    /// The root is subsumed by `expression`.
    Subsumer {
        expression: NodeId,
        origin: SubsumerOrigin,
    },
    /// The root is related by `relation` to an instance of `target`.
    ForwardLink { relation: PropertyId, target: NodeId },
    /// An instance of `source` is related by `relation` to the root.
    BackwardLink { source: NodeId, relation: PropertyId },
    /// Any context linked to the root by a sub-relation of `relation` is
    /// subsumed by the existential `carry`.
    Propagation { relation: PropertyId, carry: NodeId },
    /// The root is unsatisfiable.
    Contradiction,
    /// The root is subsumed by `member`, one of the members of `axiom`.
    DisjointSubsumer {
        axiom: DisjointnessId,
        member: NodeId,
    },
}

impl Conclusion {
    #[must_use]
    pub fn plain(expression: NodeId) -> Self {
        Self::Subsumer {
            expression,
            origin: SubsumerOrigin::Plain,
        }
    }

    #[must_use]
    pub fn composed(expression: NodeId) -> Self {
        Self::Subsumer {
            expression,
            origin: SubsumerOrigin::Composed,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ConclusionKind {
        match self {
            Conclusion::Subsumer {
                origin: SubsumerOrigin::Plain,
                ..
            } => ConclusionKind::PlainSubsumer,
            Conclusion::Subsumer {
                origin: SubsumerOrigin::Composed,
                ..
            } => ConclusionKind::ComposedSubsumer,
            Conclusion::ForwardLink { .. } => ConclusionKind::ForwardLink,
            Conclusion::BackwardLink { .. } => ConclusionKind::BackwardLink,
            Conclusion::Propagation { .. } => ConclusionKind::Propagation,
            Conclusion::Contradiction => ConclusionKind::Contradiction,
            Conclusion::DisjointSubsumer { .. } => ConclusionKind::DisjointSubsumer,
        }
    }
}

/// Discriminant of [`Conclusion`], used for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConclusionKind {
    PlainSubsumer,
    ComposedSubsumer,
    ForwardLink,
    BackwardLink,
    Propagation,
    Contradiction,
    DisjointSubsumer,
}

impl ConclusionKind {
    pub const ALL: [ConclusionKind; 7] = [
        ConclusionKind::PlainSubsumer,
        ConclusionKind::ComposedSubsumer,
        ConclusionKind::ForwardLink,
        ConclusionKind::BackwardLink,
        ConclusionKind::Propagation,
        ConclusionKind::Contradiction,
        ConclusionKind::DisjointSubsumer,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlainSubsumer => "plain subsumer",
            Self::ComposedSubsumer => "composed subsumer",
            Self::ForwardLink => "forward link",
            Self::BackwardLink => "backward link",
            Self::Propagation => "propagation",
            Self::Contradiction => "contradiction",
            Self::DisjointSubsumer => "disjoint subsumer",
        }
    }
}
