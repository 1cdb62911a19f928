//! Indoor/outdoor sample pairing.
//!
//! Samples are only paired when both locations reported at exactly the same
//! minute. There is no interpolation and no nearest-neighbour fallback.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    analytics::DailyValue,
    reading::{Location, Reading},
};

/// Indoor and outdoor temperature at one shared timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedSample {
    pub timestamp: NaiveDateTime,
    pub indoor_temp: f64,
    pub outdoor_temp: f64,
}

impl PairedSample {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Absolute indoor/outdoor difference.
    pub fn divergence(&self) -> f64 {
        (self.indoor_temp - self.outdoor_temp).abs()
    }
}

/// Join indoor and outdoor readings on identical timestamps, ascending.
pub fn pair_by_timestamp(readings: &[Reading]) -> Vec<PairedSample> {
    let outdoor: HashMap<NaiveDateTime, f64> = readings
        .iter()
        .filter(|r| r.location == Location::Outdoor)
        .map(|r| (r.timestamp, r.temperature_c))
        .collect();

    let mut pairs: Vec<PairedSample> = readings
        .iter()
        .filter(|r| r.location == Location::Indoor)
        .filter_map(|r| {
            outdoor.get(&r.timestamp).map(|&outdoor_temp| PairedSample {
                timestamp: r.timestamp,
                indoor_temp: r.temperature_c,
                outdoor_temp,
            })
        })
        .collect();

    pairs.sort_by_key(|p| p.timestamp);
    tracing::debug!("Paired {} indoor/outdoor samples", pairs.len());
    pairs
}

/// Split an ascending pair series into per-day runs, in date order.
pub fn pairs_by_day(pairs: &[PairedSample]) -> BTreeMap<NaiveDate, Vec<PairedSample>> {
    let mut days: BTreeMap<NaiveDate, Vec<PairedSample>> = BTreeMap::new();
    for pair in pairs {
        days.entry(pair.date()).or_default().push(*pair);
    }
    days
}

/// Mean absolute indoor/outdoor difference per day, in date order.
pub fn daily_divergence(pairs: &[PairedSample]) -> Vec<DailyValue> {
    pairs_by_day(pairs)
        .into_iter()
        .map(|(date, samples)| {
            let total: f64 = samples.iter().map(PairedSample::divergence).sum();
            DailyValue::new(date, total / samples.len() as f64)
        })
        .collect()
}
