//! # Flux Engine
//!
//! Eddy-covariance flux computation over sealed raw windows.
//!
//! Steps per window:
//! - clean the raw rows (and the optional supplemental set)
//! - double-rotate the wind and remove the means
//! - search the w'/c' cross-covariance over ±1 s of lag
//! - derive flux, friction velocity and the steady-state class
//! - append the flux row and the diagnostic curve

pub mod constants;
pub mod engine;
pub mod error;
pub mod lag;
pub mod output;
pub mod reader;
pub mod rotation;
pub mod stats;
pub mod steady;

pub use constants::FluxConstants;
pub use engine::FluxEngine;
pub use error::FluxError;
pub use output::FluxOutput;
pub use reader::{clean_lines, read_clean, CleanSeries};
pub use rotation::{double_rotate, RotatedWind};
pub use steady::{steady_state_test, SteadyStateTest};
