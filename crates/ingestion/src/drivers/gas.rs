//! Trace-gas analyzer driver
//!
//! Frame: comma-delimited ASCII terminated by `\r`, at least 19 fields.
//! Field 2 is the real-time concentration, 7 the ambient temperature,
//! 9 the optical transmittance.

use std::io::Read;

use chrono::{Local, NaiveDateTime};
use contracts::{ContractError, GasSample, SensorChannel, SensorDriver, SensorSample};
use tracing::trace;

use super::{parse_field, read_frame, split_fields};
use crate::framing::{FrameReader, Framing};

/// Minimum field count of a gas frame
pub const GAS_MIN_FIELDS: usize = 19;

const CONCENTRATION: usize = 2;
const AMBIENT_TEMPERATURE: usize = 7;
const TRANSMITTANCE: usize = 9;

/// Decode one gas frame (delimiters already stripped)
pub fn decode_gas_frame(
    sensor: &str,
    frame: &[u8],
    timestamp: NaiveDateTime,
) -> Result<GasSample, ContractError> {
    let fields = split_fields(sensor, frame, GAS_MIN_FIELDS)?;
    Ok(GasSample {
        timestamp,
        concentration: parse_field(sensor, &fields, CONCENTRATION, "concentration")?,
        ambient_temperature: parse_field(
            sensor,
            &fields,
            AMBIENT_TEMPERATURE,
            "ambient_temperature",
        )?,
        transmittance: parse_field(sensor, &fields, TRANSMITTANCE, "transmittance")?,
    })
}

/// Gas analyzer over any byte transport
pub struct GasAnalyzerDriver<R> {
    name: String,
    frames: FrameReader<R>,
}

impl<R: Read> GasAnalyzerDriver<R> {
    pub fn new(name: impl Into<String>, transport: R) -> Self {
        Self {
            name: name.into(),
            frames: FrameReader::new(transport, Framing::CARRIAGE_RETURN),
        }
    }
}

impl<R: Read + Send> SensorDriver for GasAnalyzerDriver<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> SensorChannel {
        SensorChannel::Gas
    }

    fn poll(&mut self) -> Result<Option<SensorSample>, ContractError> {
        let Some(frame) = read_frame(&mut self.frames, &self.name)? else {
            return Ok(None);
        };
        let sample = decode_gas_frame(&self.name, &frame, Local::now().naive_local())?;
        trace!(sensor = %self.name, concentration = sample.concentration, "gas frame decoded");
        Ok(Some(sample.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const GOOD_FRAME: &str =
        "HT8600,1,31.872,0,0,0,0,24.6,0,87.25,0,0,0,0,0,0,0,0,0";

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_decode_good_frame() {
        let sample = decode_gas_frame("gas", GOOD_FRAME.as_bytes(), ts()).unwrap();
        assert_eq!(sample.concentration, 31.872);
        assert_eq!(sample.ambient_temperature, 24.6);
        assert_eq!(sample.transmittance, 87.25);
        assert_eq!(sample.timestamp, ts());
    }

    #[test]
    fn test_decode_short_frame() {
        let err = decode_gas_frame("gas", b"HT8600,1,31.8,0", ts()).unwrap_err();
        assert!(err.is_frame_local());
        assert!(err.to_string().contains("at least 19 fields"));
    }

    #[test]
    fn test_decode_bad_number() {
        let frame = GOOD_FRAME.replace("31.872", "3l.8");
        let err = decode_gas_frame("gas", frame.as_bytes(), ts()).unwrap_err();
        assert!(err.to_string().contains("concentration"));
    }

    #[test]
    fn test_driver_polls_frames_then_reports_eof() {
        let wire = format!("{GOOD_FRAME}\r\nbad\r{GOOD_FRAME}\r");
        let mut driver = GasAnalyzerDriver::new("gas", Cursor::new(wire.into_bytes()));
        assert_eq!(driver.channel(), SensorChannel::Gas);

        assert!(matches!(driver.poll(), Ok(Some(SensorSample::Gas(_)))));
        // "\nbad" is a malformed frame, the driver keeps going
        let err = driver.poll().unwrap_err();
        assert!(err.is_frame_local());
        assert!(matches!(driver.poll(), Ok(Some(SensorSample::Gas(_)))));

        let err = driver.poll().unwrap_err();
        assert!(matches!(err, ContractError::Transport { .. }));
    }
}
