//! Errors raised while building or editing the node/rule graph.

use thiserror::Error;

use crate::{NodeId, PropertyId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown property {0}")]
    UnknownProperty(PropertyId),

    #[error("a disjointness axiom needs at least two members, found {found}")]
    DisjointnessTooSmall { found: usize },

    #[error("no told axiom {sub} ⊑ {sup} to remove")]
    AxiomNotFound { sub: NodeId, sup: NodeId },
}
