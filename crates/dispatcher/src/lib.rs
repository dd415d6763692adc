//! # Dispatcher
//!
//! Raw window persistence and rotation.
//!
//! Responsibilities:
//! - Append every emitted `CombinedRecord` to the open window file
//! - Seal the window on a rotation boundary and hand it to the `WindowAnalyzer`
//! - Isolate analysis failures from the writer loop
//! - Drive the whole acquisition path from a periodic tick

pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod rotation;
pub mod run_loop;
pub mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use contracts::{SealedWindow, WindowAnalyzer, WindowId};
pub use dispatcher::{DispatcherConfig, RotationDispatcher};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use rotation::{should_rotate, OpenWindow, RotationState};
pub use run_loop::{AcquisitionLoop, LoopStats};
pub use writer::WindowWriter;
