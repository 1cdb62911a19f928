use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a sensor is placed. Only two placements exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Location {
    Indoor,
    Outdoor,
}

impl Location {
    /// The token used in source files and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Indoor => "Indoor",
            Location::Outdoor => "Outdoor",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown location {0:?}")]
pub struct LocationParseError(pub String);

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Indoor" => Ok(Location::Indoor),
            "Outdoor" => Ok(Location::Outdoor),
            other => Err(LocationParseError(other.to_string())),
        }
    }
}

/// A single validated temperature and humidity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub location: Location,
    pub temperature_c: f64,
    /// Relative humidity, always within 0..=100.
    pub humidity_pct: u8,
}

impl Reading {
    pub fn new(
        timestamp: NaiveDateTime,
        location: Location,
        temperature_c: f64,
        humidity_pct: u8,
    ) -> Self {
        Self {
            timestamp,
            location,
            temperature_c,
            humidity_pct,
        }
    }

    /// Calendar day of the sample.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
