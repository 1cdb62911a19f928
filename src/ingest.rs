//! Reading validation for raw CSV exports.
//!
//! Source files are hand-collected sensor dumps and contain broken rows,
//! duplicates and the occasional typographic minus sign. Every row is either
//! turned into a [`Reading`] or dropped; nothing here aborts ingestion.

use std::{collections::HashSet, fs::File, io::Read, path::Path};

use chrono::{NaiveDateTime, Timelike};
use csv::StringRecord;
use serde::Serialize;
use thiserror::Error;

use crate::reading::{Location, LocationParseError, Reading};

/// Accepted timestamp layouts, tried in order.
pub const DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %-H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %-H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

pub const MIN_TEMPERATURE_C: f64 = -50.0;
pub const MAX_TEMPERATURE_C: f64 = 60.0;

const UNICODE_MINUS: char = '\u{2212}';

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected at least 4 columns, found {0}")]
    MissingColumns(usize),
    #[error("unrecognised timestamp {0:?}")]
    Timestamp(String),
    #[error(transparent)]
    Location(#[from] LocationParseError),
    #[error("unparseable temperature {0:?}")]
    Temperature(String),
    #[error("implausible temperature {0}")]
    ImplausibleTemperature(f64),
    #[error("unparseable humidity {0:?}")]
    Humidity(String),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// Counters describing one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Data rows seen (header excluded).
    pub rows: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub bad_columns: usize,
    pub bad_timestamp: usize,
    pub bad_location: usize,
    pub bad_temperature: usize,
    pub bad_humidity: usize,
}

impl IngestReport {
    /// Total number of rows dropped for a data error (duplicates excluded).
    pub fn rejected(&self) -> usize {
        self.bad_columns
            + self.bad_timestamp
            + self.bad_location
            + self.bad_temperature
            + self.bad_humidity
    }

    fn record_rejection(&mut self, error: &RowError) {
        match error {
            RowError::MissingColumns(_) | RowError::Unreadable(_) => self.bad_columns += 1,
            RowError::Timestamp(_) => self.bad_timestamp += 1,
            RowError::Location(_) => self.bad_location += 1,
            RowError::Temperature(_) | RowError::ImplausibleTemperature(_) => {
                self.bad_temperature += 1
            }
            RowError::Humidity(_) => self.bad_humidity += 1,
        }
    }
}

/// Output of an ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub readings: Vec<Reading>,
    pub report: IngestReport,
}

/// Parse a timestamp against [`DATE_FORMATS`], truncated to the minute.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATE_FORMATS.iter().find_map(|format| {
        let parsed = NaiveDateTime::parse_from_str(text, format).ok()?;
        parsed.with_second(0)?.with_nanosecond(0)
    })
}

/// Parse a temperature, rejecting values outside the plausible sensor range.
pub fn parse_temperature(text: &str) -> Result<f64, RowError> {
    let normalized: String = text
        .trim()
        .chars()
        .map(|c| if c == UNICODE_MINUS { '-' } else { c })
        .filter(|c| *c != ' ')
        .collect();

    let value: f64 = normalized
        .parse()
        .map_err(|_| RowError::Temperature(text.trim().to_string()))?;

    // NaN fails `contains` as well.
    if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&value) {
        return Err(RowError::ImplausibleTemperature(value));
    }
    Ok(value)
}

/// Parse a relative humidity and clamp it into 0..=100.
pub fn parse_humidity(text: &str) -> Result<u8, RowError> {
    let raw: i32 = text
        .trim()
        .parse()
        .map_err(|_| RowError::Humidity(text.trim().to_string()))?;
    Ok(raw.clamp(0, 100) as u8)
}

/// Turn one CSV record into a reading. Columns past the fourth are ignored.
pub fn parse_record(record: &StringRecord) -> Result<Reading, RowError> {
    if record.len() < 4 {
        return Err(RowError::MissingColumns(record.len()));
    }

    let timestamp =
        parse_timestamp(&record[0]).ok_or_else(|| RowError::Timestamp(record[0].trim().into()))?;
    let location: Location = record[1].parse()?;
    let temperature_c = parse_temperature(&record[2])?;
    let humidity_pct = parse_humidity(&record[3])?;

    Ok(Reading::new(timestamp, location, temperature_c, humidity_pct))
}

/// Accumulates validated, deduplicated readings row by row.
#[derive(Debug, Default)]
pub struct ReadingValidator {
    seen: HashSet<(NaiveDateTime, Location)>,
    readings: Vec<Reading>,
    report: IngestReport,
}

impl ReadingValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one record. The first reading for a (timestamp, location)
    /// pair is kept and any later one is dropped.
    pub fn push(&mut self, record: &StringRecord) {
        match parse_record(record) {
            Ok(reading) => {
                self.report.rows += 1;
                if self.seen.insert((reading.timestamp, reading.location)) {
                    self.readings.push(reading);
                    self.report.accepted += 1;
                } else {
                    self.report.duplicates += 1;
                }
            }
            Err(error) => self.reject(error),
        }
    }

    /// Count a row that could not be decoded at all.
    pub fn reject(&mut self, error: RowError) {
        self.report.rows += 1;
        tracing::debug!(row = self.report.rows, %error, "Skipping row");
        self.report.record_rejection(&error);
    }

    pub fn finish(self) -> Ingested {
        Ingested {
            readings: self.readings,
            report: self.report,
        }
    }
}

/// Read CSV data whose first row is a header.
pub fn read_csv<R: Read>(reader: R) -> Ingested {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut validator = ReadingValidator::new();
    for result in rdr.records() {
        match result {
            Ok(record) => validator.push(&record),
            Err(e) if e.is_io_error() => {
                tracing::warn!("Stopping CSV read after I/O error: {}", e);
                break;
            }
            Err(e) => validator.reject(RowError::Unreadable(e.to_string())),
        }
    }

    let ingested = validator.finish();
    let report = &ingested.report;
    if report.rejected() > 0 {
        tracing::warn!(
            "Skipped {} of {} rows with invalid data",
            report.rejected(),
            report.rows
        );
    }
    tracing::debug!(
        rows = report.rows,
        accepted = report.accepted,
        duplicates = report.duplicates,
        rejected = report.rejected(),
        "CSV ingestion finished"
    );
    ingested
}

/// Convenience wrapper for in-memory CSV text.
pub fn parse_csv_str(text: &str) -> Ingested {
    read_csv(text.as_bytes())
}

/// Read a CSV file. A missing or unreadable file yields no readings.
pub fn load_csv_file(path: &Path) -> Ingested {
    match File::open(path) {
        Ok(file) => {
            let ingested = read_csv(file);
            tracing::info!(
                "Read {} readings from {} ({} duplicates, {} rejected)",
                ingested.report.accepted,
                path.display(),
                ingested.report.duplicates,
                ingested.report.rejected()
            );
            ingested
        }
        Err(e) => {
            tracing::warn!(
                "Cannot open {} ({}), continuing without readings",
                path.display(),
                e
            );
            Ingested::default()
        }
    }
}
