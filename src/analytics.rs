use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    door::{self, DoorOpenDay, DoorThresholds},
    mold,
    pairing,
    reading::{Location, Reading},
};

// ==================== Result Types ====================

/// Requested direction of a ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum SortOrder {
    #[default]
    #[value(name = "asc")]
    Ascending,
    #[value(name = "desc")]
    Descending,
}

/// One summary value for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl DailyValue {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Overview of a reading snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub readings: usize,
    pub indoor: usize,
    pub outdoor: usize,
    /// Number of distinct calendar days with at least one reading.
    pub days: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

// ==================== Grouping ====================

/// Group one location's readings by calendar day, in date order.
pub fn group_by_day(readings: &[Reading], location: Location) -> BTreeMap<NaiveDate, Vec<&Reading>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
    for reading in readings.iter().filter(|r| r.location == location) {
        days.entry(reading.date()).or_default().push(reading);
    }
    days
}

fn daily_values<F>(readings: &[Reading], location: Location, summarize: F) -> Vec<DailyValue>
where
    F: Fn(&[&Reading]) -> f64,
{
    group_by_day(readings, location)
        .into_iter()
        .map(|(date, samples)| DailyValue::new(date, summarize(&samples)))
        .collect()
}

/// Mean of the values, `None` when there are none.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Stable sort by value. Equal values keep their incoming (date) order.
pub fn sort_daily(values: &mut [DailyValue], order: SortOrder) {
    match order {
        SortOrder::Ascending => values.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortOrder::Descending => values.sort_by(|a, b| b.value.total_cmp(&a.value)),
    }
}

fn ranked(mut values: Vec<DailyValue>, order: SortOrder) -> Vec<DailyValue> {
    sort_daily(&mut values, order);
    values
}

// ==================== Daily Statistics ====================

/// Mean temperature of one location on one day.
pub fn mean_temperature(readings: &[Reading], date: NaiveDate, location: Location) -> Option<f64> {
    mean(
        readings
            .iter()
            .filter(|r| r.location == location && r.date() == date)
            .map(|r| r.temperature_c),
    )
}

/// Mean temperature per day, in date order.
pub fn daily_mean_temperature(readings: &[Reading], location: Location) -> Vec<DailyValue> {
    daily_values(readings, location, |samples| {
        samples.iter().map(|r| r.temperature_c).sum::<f64>() / samples.len() as f64
    })
}

/// Mean relative humidity per day, in date order.
pub fn daily_mean_humidity(readings: &[Reading], location: Location) -> Vec<DailyValue> {
    daily_values(readings, location, |samples| {
        samples.iter().map(|r| f64::from(r.humidity_pct)).sum::<f64>() / samples.len() as f64
    })
}

/// Percentage of each day's samples that sit in the mold risk zone.
pub fn daily_mold_risk(readings: &[Reading], location: Location) -> Vec<DailyValue> {
    daily_values(readings, location, |samples| {
        let at_risk = samples
            .iter()
            .filter(|r| mold::is_mold_risk(r.temperature_c, r.humidity_pct))
            .count();
        at_risk as f64 * 100.0 / samples.len() as f64
    })
}

// ==================== Rankings ====================

pub fn ranked_by_mean_temperature(
    readings: &[Reading],
    location: Location,
    order: SortOrder,
) -> Vec<DailyValue> {
    ranked(daily_mean_temperature(readings, location), order)
}

pub fn ranked_by_mean_humidity(
    readings: &[Reading],
    location: Location,
    order: SortOrder,
) -> Vec<DailyValue> {
    ranked(daily_mean_humidity(readings, location), order)
}

pub fn ranked_by_mold_risk(
    readings: &[Reading],
    location: Location,
    order: SortOrder,
) -> Vec<DailyValue> {
    ranked(daily_mold_risk(readings, location), order)
}

/// Days ranked by mean |indoor - outdoor| over their paired samples.
pub fn ranked_by_divergence(readings: &[Reading], order: SortOrder) -> Vec<DailyValue> {
    let pairs = pairing::pair_by_timestamp(readings);
    ranked(pairing::daily_divergence(&pairs), order)
}

/// Days ranked by estimated door-open time, longest first.
pub fn ranked_by_door_open_duration(
    readings: &[Reading],
    thresholds: &DoorThresholds,
) -> Vec<DoorOpenDay> {
    let pairs = pairing::pair_by_timestamp(readings);
    let mut days = door::door_open_per_day(&pairs, thresholds);
    days.sort_by(|a, b| b.open_duration.cmp(&a.open_duration));
    days
}

// ==================== Summary ====================

pub fn summarize(readings: &[Reading]) -> DatasetSummary {
    let indoor = readings
        .iter()
        .filter(|r| r.location == Location::Indoor)
        .count();
    let mut dates: Vec<NaiveDate> = readings.iter().map(Reading::date).collect();
    dates.sort_unstable();
    dates.dedup();

    DatasetSummary {
        readings: readings.len(),
        indoor,
        outdoor: readings.len() - indoor,
        days: dates.len(),
        first_day: dates.first().copied(),
        last_day: dates.last().copied(),
    }
}
