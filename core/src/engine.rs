//! Rule application engines.
//!
//! A [`RuleApplicationFactory`] is shared by every worker of a run; each
//! worker obtains its own [`RuleApplicationEngine`], which keeps statistics
//! locally until [`RuleApplicationEngine::finish`].

use std::sync::Arc;

use parking_lot::Mutex;
use saturate_types::NodeId;

use crate::rules::Writer;
use crate::{Context, Interrupter, RuleStatistics, SaturationState};

/// Receives every context created by a rule application engine.
///
/// Called after the context is queued for saturation marking and has received
/// its initial conclusions.
pub trait ContextCreationListener {
    fn notify_context_creation(&self, context: &Context);
}

impl<F> ContextCreationListener for F
where
    F: Fn(&Context),
{
    fn notify_context_creation(&self, context: &Context) {
        self(context);
    }
}

#[derive(Debug)]
pub struct RuleApplicationFactory {
    state: Arc<SaturationState>,
    interrupter: Interrupter,
    aggregated: Mutex<RuleStatistics>,
    timings: bool,
}

impl RuleApplicationFactory {
    #[must_use]
    pub fn new(state: Arc<SaturationState>, interrupter: Interrupter) -> Self {
        Self {
            state,
            interrupter,
            aggregated: Mutex::new(RuleStatistics::new()),
            timings: false,
        }
    }

    /// Enables wall-time measurement per rule kind.
    #[must_use]
    pub fn with_rule_timings(mut self, enabled: bool) -> Self {
        self.timings = enabled;
        self
    }

    #[must_use]
    pub fn state(&self) -> &Arc<SaturationState> {
        &self.state
    }

    #[must_use]
    pub fn interrupter(&self) -> &Interrupter {
        &self.interrupter
    }

    /// Statistics merged from every finished engine.
    #[must_use]
    pub fn statistics(&self) -> RuleStatistics {
        self.aggregated.lock().clone()
    }

    pub fn engine<'a, L>(&'a self, listener: &'a L) -> RuleApplicationEngine<'a, L>
    where
        L: ContextCreationListener + ?Sized,
    {
        RuleApplicationEngine {
            factory: self,
            listener,
            stats: RuleStatistics::new(),
        }
    }
}

/// Per-worker handle for applying rules to the shared state.
pub struct RuleApplicationEngine<'a, L: ?Sized> {
    factory: &'a RuleApplicationFactory,
    listener: &'a L,
    stats: RuleStatistics,
}

impl<L: ContextCreationListener + ?Sized> RuleApplicationEngine<'_, L> {
    fn writer(&mut self) -> Writer<'_, L> {
        let factory = self.factory;
        Writer {
            state: &factory.state,
            listener: self.listener,
            stats: &mut self.stats,
            timings: factory.timings,
        }
    }

    /// Returns the context for `root`, creating and initializing it if absent.
    ///
    /// No rules are applied until [`process`](Self::process) is called.
    pub fn submit(&mut self, root: NodeId) -> Arc<Context> {
        self.writer().get_or_create(root)
    }

    /// Drains active contexts until none is left or the run is interrupted.
    ///
    /// The interruption flag is checked before each context is taken, so a
    /// context is never left half-drained while holding its activation token.
    /// Returns `true` if the pass stopped on the flag, in which case active
    /// contexts may still hold pending conclusions.
    pub fn process(&mut self) -> bool {
        let factory = self.factory;
        let mut writer = self.writer();
        loop {
            if factory.interrupter.is_interrupted() {
                return true;
            }
            let Some(context) = factory.state.take_active() else {
                return false;
            };
            writer.stats.record_context();
            loop {
                while let Some(conclusion) = context.pop() {
                    writer.apply(&context, conclusion);
                }
                if !context.deactivate() {
                    break;
                }
            }
        }
    }

    /// Statistics gathered by this engine since the last `finish`.
    #[must_use]
    pub fn local_statistics(&self) -> &RuleStatistics {
        &self.stats
    }

    /// Merges local statistics into the factory aggregate.
    pub fn finish(&mut self) {
        let local = std::mem::take(&mut self.stats);
        self.factory.aggregated.lock().merge(&local);
    }
}
