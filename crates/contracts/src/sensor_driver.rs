//! SensorDriver trait - Sensor decoder abstraction
//!
//! One implementation per sensor protocol; the transport is injected.

use crate::{ContractError, SensorChannel, SensorSample};

/// Sensor driver trait
///
/// A driver owns its transport and turns raw bytes into normalized samples.
/// Intake tasks call [`SensorDriver::poll`] in a loop until the stop signal fires.
///
/// # Example
///
/// ```ignore
/// let mut driver: Box<dyn SensorDriver> = open_driver(&config)?;
/// while !stop.is_stopped() {
///     match driver.poll() {
///         Ok(Some(sample)) => readings.update(sample),
///         Ok(None) => continue,
///         Err(e) => tracing::warn!(error = %e, "decode failed"),
///     }
/// }
/// ```
pub trait SensorDriver: Send {
    /// Driver name
    fn name(&self) -> &str;

    /// Channel produced by this driver
    fn channel(&self) -> SensorChannel;

    /// Read until one frame is complete or the transport has nothing to offer
    ///
    /// Returns `Ok(None)` when no complete frame is available yet.
    ///
    /// # Errors
    /// `FrameDecode` for a malformed frame (the next poll may succeed),
    /// `Transport` when the underlying byte source failed.
    fn poll(&mut self) -> Result<Option<SensorSample>, ContractError>;
}
