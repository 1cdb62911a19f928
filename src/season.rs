//! Meteorological season onset from outdoor daily means.
//!
//! A season starts on the first day of the earliest run of
//! [`RUN_LENGTH`] consecutive calendar days whose mean outdoor temperature
//! meets the season's threshold. Days without data break a run.

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::Serialize;

use crate::{
    analytics::{self, DailyValue},
    reading::{Location, Reading},
};

/// Number of consecutive qualifying days that mark an onset.
pub const RUN_LENGTH: usize = 5;

/// Autumn threshold: daily mean strictly below this.
pub const AUTUMN_MAX_MEAN_C: f64 = 10.0;
/// Winter threshold: daily mean at or below this.
pub const WINTER_MAX_MEAN_C: f64 = 0.0;

/// Autumn cannot begin before this day of the first data year.
const AUTUMN_EARLIEST: (u32, u32) = (8, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Autumn,
    Winter,
}

impl Season {
    /// Whether a day with this mean temperature counts towards the season.
    pub fn qualifies(self, mean_temp_c: f64) -> bool {
        match self {
            Season::Autumn => mean_temp_c < AUTUMN_MAX_MEAN_C,
            Season::Winter => mean_temp_c <= WINTER_MAX_MEAN_C,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// First day a run may start on, given the first day with data.
    fn earliest_start(self, first_day: NaiveDate) -> Option<NaiveDate> {
        match self {
            Season::Autumn => {
                NaiveDate::from_ymd_opt(first_day.year(), AUTUMN_EARLIEST.0, AUTUMN_EARLIEST.1)
            }
            Season::Winter => None,
        }
    }
}

/// Whether the window covers strictly consecutive calendar days.
fn is_consecutive(window: &[DailyValue]) -> bool {
    let start = window[0].date;
    window
        .iter()
        .enumerate()
        .all(|(offset, day)| day.date == start + TimeDelta::days(offset as i64))
}

/// First day of the earliest qualifying run in `days`, which must be sorted
/// ascending by date.
pub fn find_first_run<P>(days: &[DailyValue], qualifies: P) -> Option<NaiveDate>
where
    P: Fn(f64) -> bool,
{
    days.windows(RUN_LENGTH)
        .find(|window| is_consecutive(window) && window.iter().all(|d| qualifies(d.value)))
        .map(|window| window[0].date)
}

/// Onset of `season` in the outdoor readings of the snapshot.
pub fn onset(readings: &[Reading], season: Season) -> Option<NaiveDate> {
    let daily = analytics::daily_mean_temperature(readings, Location::Outdoor);
    let first_day = daily.first()?.date;

    let candidates = match season.earliest_start(first_day) {
        Some(floor) => {
            let skip = daily.partition_point(|d| d.date < floor);
            &daily[skip..]
        }
        None => &daily[..],
    };

    let found = find_first_run(candidates, |mean| season.qualifies(mean));
    tracing::debug!(
        "{} onset scan over {} days: {:?}",
        season.name(),
        candidates.len(),
        found
    );
    found
}

/// First day of meteorological autumn (5 days below 10 °C, from August 1).
pub fn autumn_onset(readings: &[Reading]) -> Option<NaiveDate> {
    onset(readings, Season::Autumn)
}

/// First day of meteorological winter (5 days at or below 0 °C).
pub fn winter_onset(readings: &[Reading]) -> Option<NaiveDate> {
    onset(readings, Season::Winter)
}
