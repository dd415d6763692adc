//! # Ingestion Pipeline
//!
//! Sensor data ingestion module.
//!
//! Responsibilities:
//! - Frame raw byte transports (device files, TCP serial bridges)
//! - Decode gas analyzer and sonic anemometer frames into `SensorSample`
//! - Provide a mock driver for runs without hardware
//! - Run one blocking intake task per driver, feeding the aggregator
//!
//! ## Usage Example
//!
//! ```ignore
//! use acquisition::Aggregator;
//! use ingestion::IngestionPipeline;
//!
//! let aggregator = Aggregator::new(blueprint.acquisition.sampling_hz);
//! let pipeline = IngestionPipeline::from_sensors(&blueprint.sensors)?;
//! let intake = pipeline.start(aggregator.handle(), stop.clone());
//! // ... run the tick loop ...
//! stop.stop();
//! intake.join().await;
//! ```
//!
//! Decode errors drop one frame and are counted; a transport error ends the
//! intake task of that sensor only.

mod config;
mod drivers;
mod error;
mod framing;
mod pipeline;
mod transport;

// Re-exports
pub use config::{IngestionMetrics, IntakeConfig, MetricsSnapshot};
pub use drivers::{
    decode_gas_frame, decode_wind_frame, GasAnalyzerDriver, MockDriver, SonicAnemometerDriver,
    SyntheticSignal, GAS_MIN_FIELDS, WIND_MIN_FIELDS,
};
pub use error::{IngestionError, Result};
pub use framing::{FrameReader, Framing, MAX_FRAME_LEN};
pub use pipeline::{IngestionPipeline, IntakeHandle};
pub use transport::{open_driver, open_transport};
