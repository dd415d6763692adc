//! Raw window reading and cleaning
//!
//! A row is dropped when it has the wrong number of fields or any field is a
//! missing-value marker. Remaining non-timestamp fields that fail to parse
//! become zero.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::RAW_COLUMNS;
use tracing::debug;

use crate::error::FluxError;

/// Field values treated as missing
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const CONCENTRATION: usize = 1;
const U: usize = 4;
const V: usize = 5;
const W: usize = 6;

/// Cleaned columns used by the computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanSeries {
    /// First timestamp, verbatim
    pub first_timestamp: Option<String>,
    /// Concentration divided by the scale constant
    pub concentration: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub w: Vec<f64>,
    /// Rows dropped by cleaning
    pub dropped: usize,
}

impl CleanSeries {
    pub fn len(&self) -> usize {
        self.w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    /// Append another cleaned set after this one
    pub fn extend(&mut self, other: CleanSeries) {
        if self.first_timestamp.is_none() {
            self.first_timestamp = other.first_timestamp;
        }
        self.concentration.extend(other.concentration);
        self.u.extend(other.u);
        self.v.extend(other.v);
        self.w.extend(other.w);
        self.dropped += other.dropped;
    }

    fn push_row(&mut self, fields: &[&str], concentration_scale: f64) {
        let number = |i: usize| fields[i].trim().parse::<f64>().unwrap_or(0.0);
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(fields[0].trim().to_string());
        }
        self.concentration
            .push(number(CONCENTRATION) / concentration_scale);
        self.u.push(number(U));
        self.v.push(number(V));
        self.w.push(number(W));
    }
}

fn is_missing(field: &str) -> bool {
    let field = field.trim();
    MISSING_MARKERS.contains(&field)
}

/// Clean raw window rows (header line first)
pub fn clean_lines<I, S>(lines: I, concentration_scale: f64) -> CleanSeries
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut series = CleanSeries::default();
    for line in lines.into_iter().skip(1) {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != RAW_COLUMNS || fields.iter().any(|f| is_missing(f)) {
            series.dropped += 1;
            continue;
        }
        series.push_row(&fields, concentration_scale);
    }
    series
}

/// Read and clean a raw window file
pub fn read_clean(path: &Path, concentration_scale: f64) -> Result<CleanSeries, FluxError> {
    let file = File::open(path).map_err(|e| FluxError::io(path, e))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FluxError::io(path, e))?;
    let series = clean_lines(lines, concentration_scale);
    debug!(
        path = %path.display(),
        rows = series.len(),
        dropped = series.dropped,
        "window cleaned"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RAW_HEADER;

    #[test]
    fn test_drops_missing_and_malformed_rows() {
        let lines = vec![
            RAW_HEADER,
            "2024-06-01 12:00:00.000,480,24,88,1.0,0.5,0.1,20",
            "2024-06-01 12:00:00.100,,,,1.0,0.5,0.1,20",
            "2024-06-01 12:00:00.200,None,24,88,1.0,0.5,0.1,20",
            "2024-06-01 12:00:00.300,NaN,24,88,1.0,0.5,0.1,20",
            "2024-06-01 12:00:00.400,480,24,88,1.0,0.5",
            "2024-06-01 12:00:00.500,496,24,88,1.2,0.4,-0.1,20",
        ];
        let series = clean_lines(lines, 16.0);
        assert_eq!(series.len(), 2);
        assert_eq!(series.dropped, 4);
        assert_eq!(series.concentration, vec![30.0, 31.0]);
        assert_eq!(series.w, vec![0.1, -0.1]);
        assert_eq!(
            series.first_timestamp.as_deref(),
            Some("2024-06-01 12:00:00.000")
        );
    }

    #[test]
    fn test_unparseable_numbers_become_zero() {
        let lines = vec![
            RAW_HEADER,
            "2024-06-01 12:00:00.000,abc,24,88,x,0.5,0.1,20",
        ];
        let series = clean_lines(lines, 16.0);
        assert_eq!(series.concentration, vec![0.0]);
        assert_eq!(series.u, vec![0.0]);
        assert_eq!(series.v, vec![0.5]);
    }

    #[test]
    fn test_extend_keeps_first_timestamp() {
        let mut a = clean_lines(
            vec![RAW_HEADER, "2024-06-01 12:00:00.000,16,0,0,1,0,0,0"],
            16.0,
        );
        let b = clean_lines(
            vec![RAW_HEADER, "2024-05-01 00:00:00.000,32,0,0,2,0,0,0"],
            16.0,
        );
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.first_timestamp.as_deref(), Some("2024-06-01 12:00:00.000"));
        assert_eq!(a.concentration, vec![1.0, 2.0]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_clean(Path::new("/nonexistent/window.csv"), 16.0).unwrap_err();
        assert!(matches!(err, FluxError::Io { .. }));
    }
}
