//! Sonic anemometer driver
//!
//! Frame: `0x02 <ascii> 0x03`, comma-delimited, at least 8 fields once the
//! delimiters are stripped. Fields 1..=3 are u, v, w and field 6 the sonic
//! temperature.

use std::io::Read;

use contracts::{ContractError, SensorChannel, SensorDriver, SensorSample, WindSample};
use tracing::trace;

use super::{parse_field, read_frame, split_fields};
use crate::framing::{FrameReader, Framing};

/// Minimum field count of a wind frame
pub const WIND_MIN_FIELDS: usize = 8;

/// Decode one wind frame (delimiters already stripped)
pub fn decode_wind_frame(sensor: &str, frame: &[u8]) -> Result<WindSample, ContractError> {
    let fields = split_fields(sensor, frame, WIND_MIN_FIELDS)?;
    Ok(WindSample {
        u: parse_field(sensor, &fields, 1, "u")?,
        v: parse_field(sensor, &fields, 2, "v")?,
        w: parse_field(sensor, &fields, 3, "w")?,
        sonic_temperature: parse_field(sensor, &fields, 6, "sonic_temperature")?,
    })
}

/// Sonic anemometer over any byte transport
pub struct SonicAnemometerDriver<R> {
    name: String,
    frames: FrameReader<R>,
}

impl<R: Read> SonicAnemometerDriver<R> {
    pub fn new(name: impl Into<String>, transport: R) -> Self {
        Self {
            name: name.into(),
            frames: FrameReader::new(transport, Framing::STX_ETX),
        }
    }
}

impl<R: Read + Send> SensorDriver for SonicAnemometerDriver<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> SensorChannel {
        SensorChannel::Wind
    }

    fn poll(&mut self) -> Result<Option<SensorSample>, ContractError> {
        let Some(frame) = read_frame(&mut self.frames, &self.name)? else {
            return Ok(None);
        };
        let sample = decode_wind_frame(&self.name, &frame)?;
        trace!(sensor = %self.name, w = sample.w, "wind frame decoded");
        Ok(Some(sample.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GOOD_FRAME: &[u8] = b"\x02Q,+001.52,-000.31,+000.07,M,00,+023.91,00,\x03";

    #[test]
    fn test_decode_good_frame() {
        let body = &GOOD_FRAME[1..GOOD_FRAME.len() - 1];
        let sample = decode_wind_frame("sonic", body).unwrap();
        assert_eq!(sample.u, 1.52);
        assert_eq!(sample.v, -0.31);
        assert_eq!(sample.w, 0.07);
        assert_eq!(sample.sonic_temperature, 23.91);
    }

    #[test]
    fn test_decode_short_frame() {
        let err = decode_wind_frame("sonic", b"Q,1.0,2.0,3.0").unwrap_err();
        assert!(err.is_frame_local());
    }

    #[test]
    fn test_decode_bad_number() {
        let err = decode_wind_frame("sonic", b"Q,1.0,x,3.0,M,00,20.0,00").unwrap_err();
        assert!(err.to_string().contains("(v)"));
    }

    #[test]
    fn test_driver_reads_frames() {
        let mut wire = b"garbage".to_vec();
        wire.extend_from_slice(GOOD_FRAME);
        wire.extend_from_slice(GOOD_FRAME);
        let mut driver = SonicAnemometerDriver::new("sonic", Cursor::new(wire));

        for _ in 0..2 {
            match driver.poll() {
                Ok(Some(SensorSample::Wind(wind))) => assert_eq!(wind.u, 1.52),
                other => panic!("unexpected poll result: {other:?}"),
            }
        }
        assert!(driver.poll().is_err());
    }
}
