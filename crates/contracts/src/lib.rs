//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the flux station.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - All timestamps are local wall-clock time (`chrono::NaiveDateTime`), the same
//!   clock that names window files.
//! - Sampling slots are `1000 / sampling_hz` milliseconds wide.

mod analyzer;
mod blueprint;
mod error;
mod flux;
mod record;
mod sample;
mod sensor_driver;
mod stop;
mod window;

pub use analyzer::WindowAnalyzer;
pub use blueprint::*;
pub use error::*;
pub use flux::*;
pub use record::*;
pub use sample::*;
pub use sensor_driver::SensorDriver;
pub use stop::StopSignal;
pub use window::*;
