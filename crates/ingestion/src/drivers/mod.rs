//! Sensor drivers
//!
//! One `SensorDriver` implementation per sensor protocol. Decoding is kept in
//! free functions so it can be exercised without a transport.

mod gas;
mod mock;
mod wind;

pub use gas::{decode_gas_frame, GasAnalyzerDriver, GAS_MIN_FIELDS};
pub use mock::{MockDriver, SyntheticSignal};
pub use wind::{decode_wind_frame, SonicAnemometerDriver, WIND_MIN_FIELDS};

use std::io::{self, Read};

use contracts::ContractError;

use crate::framing::FrameReader;

/// Pull one frame from the reader, mapping I/O failures onto the driver contract
pub(crate) fn read_frame<R: Read>(
    frames: &mut FrameReader<R>,
    sensor: &str,
) -> Result<Option<Vec<u8>>, ContractError> {
    match frames.next_frame() {
        Ok(frame) => Ok(frame),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            Err(ContractError::frame_decode(sensor, e.to_string()))
        }
        Err(e) => Err(ContractError::transport(sensor, e.to_string())),
    }
}

/// Split an ASCII frame into trimmed comma-separated fields
pub(crate) fn split_fields<'a>(
    sensor: &str,
    frame: &'a [u8],
    min_fields: usize,
) -> Result<Vec<&'a str>, ContractError> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| ContractError::frame_decode(sensor, format!("frame is not ASCII: {e}")))?;
    let fields: Vec<&str> = text.trim().split(',').map(str::trim).collect();
    if fields.len() < min_fields {
        return Err(ContractError::frame_decode(
            sensor,
            format!("expected at least {min_fields} fields, got {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// Parse one numeric field
pub(crate) fn parse_field(
    sensor: &str,
    fields: &[&str],
    index: usize,
    name: &str,
) -> Result<f64, ContractError> {
    let raw = fields.get(index).copied().unwrap_or_default();
    raw.parse::<f64>().map_err(|e| {
        ContractError::frame_decode(sensor, format!("field {index} ({name}) '{raw}': {e}"))
    })
}
