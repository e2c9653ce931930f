//! Saturation jobs and their completion listener.

use std::sync::{Arc, OnceLock};

use saturate_core::Context;
use saturate_types::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("output of the saturation job for {root} was already set")]
    OutputAlreadySet { root: NodeId },
}

/// A request to saturate one root node.
///
/// The output slot is written once, right before the listener is notified.
/// `payload` is carried through untouched for the caller.
#[derive(Debug)]
pub struct SaturationJob<T> {
    root: NodeId,
    output: OnceLock<Arc<Context>>,
    payload: T,
}

impl<T> SaturationJob<T> {
    #[must_use]
    pub fn new(root: NodeId, payload: T) -> Self {
        Self {
            root,
            output: OnceLock::new(),
            payload,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The saturated context of the root, once the job finished.
    #[must_use]
    pub fn output(&self) -> Option<&Arc<Context>> {
        self.output.get()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.output.get().is_some()
    }

    pub fn set_output(&self, context: Arc<Context>) -> Result<(), JobError> {
        self.output
            .set(context)
            .map_err(|_| JobError::OutputAlreadySet { root: self.root })
    }
}

impl SaturationJob<()> {
    #[must_use]
    pub fn for_root(root: NodeId) -> Self {
        Self::new(root, ())
    }
}

/// Notified once for every finished job, from whichever worker finished it.
pub trait SaturationListener<T> {
    fn notify_finished(&self, job: &SaturationJob<T>);
}

impl<T, F> SaturationListener<T> for F
where
    F: Fn(&SaturationJob<T>),
{
    fn notify_finished(&self, job: &SaturationJob<T>) {
        self(job);
    }
}
