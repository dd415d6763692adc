//! Cooperative stop signal shared by intake and tick loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop flag observed at the top of every loop iteration
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every loop holding a clone to exit at its next poll boundary
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
