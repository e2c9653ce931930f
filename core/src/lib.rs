//! Saturation core for saturate.
//!
//! This crate owns the per-node contexts, the shared saturation state, and
//! the rule application engines that drain pending conclusions. It knows
//! nothing about jobs or completion detection; the orchestrator in
//! `saturate-engine` drives it.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod context;
mod engine;
mod interrupt;
mod rules;
mod state;
mod stats;

pub use context::Context;
pub use engine::{ContextCreationListener, RuleApplicationEngine, RuleApplicationFactory};
pub use interrupt::Interrupter;
pub use state::SaturationState;
pub use stats::RuleStatistics;
