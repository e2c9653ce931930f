use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative interruption flag shared by every worker of one run.
///
/// Workers poll it at loop boundaries; nothing is aborted mid-conclusion.
#[derive(Debug, Clone, Default)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
}

impl Interrupter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interrupt(&self, interrupt: bool) {
        self.flag.store(interrupt, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
