//! Saturation orchestration for saturate.
//!
//! Callers wrap root nodes in [`SaturationJob`]s, submit them through a
//! [`SaturationEngine`], and let any number of workers call
//! [`SaturationEngine::process`] on engines of the same
//! [`SaturationFactory`]. Each job's listener fires once, as soon as the
//! factory can prove the root context complete, without a global barrier.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod computation;
mod counters;
mod factory;
mod job;
mod stats;

pub use computation::ConcurrentSaturation;
pub use counters::{CounterSnapshot, SaturationCounters, update_if_smaller};
pub use factory::{SaturationEngine, SaturationFactory};
pub use job::{JobError, SaturationJob, SaturationListener};
pub use stats::JobStatistics;
