//! # Acquisition
//!
//! Merges the two asynchronous sensor streams into one record per sampling slot.
//!
//! Responsibilities:
//! - Keep the latest gas and wind sample behind a single lock
//! - Let intake tasks overwrite them through a cloneable `ReadingsHandle`
//! - Emit a `CombinedRecord` at most once per `1000 / sampling_hz` ms slot
//!
//! ## Usage Example
//!
//! ```ignore
//! use acquisition::Aggregator;
//!
//! let mut aggregator = Aggregator::new(10);
//! let handle = aggregator.handle(); // give to an intake task
//! handle.update(sample);
//!
//! if let Some(record) = aggregator.tick(clock.now()) {
//!     writer.append(&record)?;
//! }
//! ```

mod aggregator;

pub use aggregator::{slot_index, Aggregator, ReadingsHandle};
pub use contracts::{CombinedRecord, LatestReadings, SensorSample};
