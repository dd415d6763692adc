//! Transport opening
//!
//! Turns a `SensorConfig` into a ready driver. Serial line settings are
//! configured out of band, so a device is opened like any other file.

use std::fs::File;
use std::io::Read;
use std::net::TcpStream;
use std::time::Duration;

use contracts::{SensorChannel, SensorConfig, SensorDriver, TransportConfig};
use tracing::info;

use crate::drivers::{GasAnalyzerDriver, MockDriver, SonicAnemometerDriver};
use crate::error::{IngestionError, Result};

/// Open the byte transport of a sensor
pub fn open_transport(sensor: &SensorConfig) -> Result<Option<Box<dyn Read + Send>>> {
    match &sensor.transport {
        TransportConfig::Device { path } => {
            let file = File::open(path).map_err(|source| IngestionError::OpenFailed {
                sensor_id: sensor.id.clone(),
                message: format!("cannot open {}", path.display()),
                source,
            })?;
            info!(sensor_id = %sensor.id, path = %path.display(), "device transport opened");
            Ok(Some(Box::new(file)))
        }
        TransportConfig::Tcp {
            address,
            read_timeout_ms,
        } => {
            let open_failed = |source: std::io::Error| IngestionError::OpenFailed {
                sensor_id: sensor.id.clone(),
                message: format!("cannot connect to {address}"),
                source,
            };
            let stream = TcpStream::connect(address).map_err(open_failed)?;
            stream
                .set_read_timeout(Some(Duration::from_millis((*read_timeout_ms).max(1))))
                .map_err(open_failed)?;
            info!(sensor_id = %sensor.id, %address, "tcp transport connected");
            Ok(Some(Box::new(stream)))
        }
        TransportConfig::Mock { .. } => Ok(None),
    }
}

/// Open the driver for one channel
pub fn open_driver(channel: SensorChannel, sensor: &SensorConfig) -> Result<Box<dyn SensorDriver>> {
    if let TransportConfig::Mock { frequency_hz } = sensor.transport {
        return Ok(Box::new(MockDriver::new(sensor.id.clone(), channel, frequency_hz)));
    }

    let Some(transport) = open_transport(sensor)? else {
        return Err(IngestionError::MissingChannel {
            channel: channel.as_str(),
        });
    };

    let driver: Box<dyn SensorDriver> = match channel {
        SensorChannel::Gas => Box::new(GasAnalyzerDriver::new(sensor.id.clone(), transport)),
        SensorChannel::Wind => Box::new(SonicAnemometerDriver::new(sensor.id.clone(), transport)),
    };
    Ok(driver)
}
