//! Domain types for saturate.
//!
//! This crate contains the indexed node/rule graph and the conclusion model,
//! with no IO, no threads, and minimal dependencies. Everything here can be
//! used from any layer of the reasoner.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod conclusion;
mod error;
mod expression;
mod graph;
mod ids;
mod rule;

pub use conclusion::{Conclusion, ConclusionKind, SubsumerOrigin};
pub use error::GraphError;
pub use expression::{DisjointnessAxiom, IndexedExpression, IndexedNode, IndexedProperty};
pub use graph::OntologyGraph;
pub use ids::{DisjointnessId, NodeId, PropertyId};
pub use rule::{CompositionRule, ConjunctionPartner, RuleChain, RuleKind};
