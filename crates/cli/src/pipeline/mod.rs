//! Station orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{RunConfig, Station};
pub use stats::StationStats;
