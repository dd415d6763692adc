//! CombinedRecord - Aggregator output
//!
//! One merged row of the raw window log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ContractError, LatestReadings};

/// Header row of every raw window file
pub const RAW_HEADER: &str = "TIMESTAMP,real_time_concentration,ambient_temperature,transmittance,u_axis_speed,v_axis_speed,w_axis_speed,sonic_temp";

/// Number of columns in a raw window row
pub const RAW_COLUMNS: usize = 8;

/// Timestamp format used in raw window rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Merged record emitted once per sampling slot
///
/// Any channel that has not reported yet leaves its fields as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub timestamp: NaiveDateTime,
    pub concentration: Option<f64>,
    pub ambient_temperature: Option<f64>,
    pub transmittance: Option<f64>,
    pub u: Option<f64>,
    pub v: Option<f64>,
    pub w: Option<f64>,
    pub sonic_temperature: Option<f64>,
}

impl CombinedRecord {
    /// Merge a snapshot of the latest readings at `timestamp`
    pub fn merge(timestamp: NaiveDateTime, readings: &LatestReadings) -> Self {
        let gas = readings.gas.as_ref();
        let wind = readings.wind.as_ref();
        Self {
            timestamp,
            concentration: gas.map(|g| g.concentration),
            ambient_temperature: gas.map(|g| g.ambient_temperature),
            transmittance: gas.map(|g| g.transmittance),
            u: wind.map(|w| w.u),
            v: wind.map(|w| w.v),
            w: wind.map(|w| w.w),
            sonic_temperature: wind.map(|w| w.sonic_temperature),
        }
    }

    /// Whether every channel field is populated
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(Option::is_some)
    }

    fn values(&self) -> [Option<f64>; RAW_COLUMNS - 1] {
        [
            self.concentration,
            self.ambient_temperature,
            self.transmittance,
            self.u,
            self.v,
            self.w,
            self.sonic_temperature,
        ]
    }

    /// Encode as one raw window CSV row (without trailing newline)
    pub fn to_csv_row(&self) -> String {
        let mut row = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        for value in self.values() {
            row.push(',');
            if let Some(v) = value {
                row.push_str(&v.to_string());
            }
        }
        row
    }

    /// Parse one raw window CSV row
    ///
    /// Empty fields become `None`; anything else must be a number.
    pub fn parse_csv_row(line: &str) -> Result<Self, ContractError> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        if fields.len() != RAW_COLUMNS {
            return Err(ContractError::record_parse(format!(
                "expected {RAW_COLUMNS} fields, got {}",
                fields.len()
            )));
        }

        let timestamp = NaiveDateTime::parse_from_str(fields[0].trim(), TIMESTAMP_FORMAT)
            .map_err(|e| ContractError::record_parse(format!("bad timestamp '{}': {e}", fields[0])))?;

        let mut values = [None; RAW_COLUMNS - 1];
        for (slot, raw) in values.iter_mut().zip(&fields[1..]) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let parsed = raw
                .parse::<f64>()
                .map_err(|e| ContractError::record_parse(format!("bad number '{raw}': {e}")))?;
            *slot = Some(parsed);
        }

        let [concentration, ambient_temperature, transmittance, u, v, w, sonic_temperature] =
            values;
        Ok(Self {
            timestamp,
            concentration,
            ambient_temperature,
            transmittance,
            u,
            v,
            w,
            sonic_temperature,
        })
    }
}
