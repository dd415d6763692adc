//! WindowAnalyzer trait - the rotation dispatcher's only downstream
//!
//! The dispatcher hands every sealed window to exactly one analyzer call,
//! on a detached task. Implementations must not assume they run on the
//! acquisition thread.

use crate::{ContractError, FluxReport, SealedWindow};

/// Analysis of one sealed window
pub trait WindowAnalyzer: Send + Sync {
    /// Analyzer name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Analyze a sealed window
    ///
    /// # Errors
    /// Returns an error if the window cannot be analyzed; the window is then
    /// absent from the output.
    fn analyze(&self, window: &SealedWindow) -> Result<FluxReport, ContractError>;
}
