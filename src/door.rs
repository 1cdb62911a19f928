//! Balcony door heuristic.
//!
//! When the door opens, indoor temperature falls quickly while the outdoor
//! sensor (mounted next to the door) warms up. The estimator walks a day's
//! paired samples through a two-state automaton and sums the time spent in
//! [`DoorState::Open`].
//!
//! Opening needs a larger swing than closing so that sensor noise does not
//! flip the state on every step.

use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use serde::{Serialize, Serializer};

use crate::{
    config::DoorConfig,
    pairing::{self, PairedSample},
};

/// Absorbs binary rounding of one-decimal sensor values, so that a drop from
/// 22.0 to 21.7 counts as 0.3.
const EPSILON: f64 = 1e-9;

/// Thresholds of the door automaton, in °C per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorThresholds {
    pub open_indoor_drop_c: f64,
    pub open_outdoor_rise_c: f64,
    pub close_indoor_rise_c: f64,
    pub close_outdoor_drop_c: f64,
    /// Longest step counted as open time. Larger gaps are capped.
    pub max_step: TimeDelta,
}

impl Default for DoorThresholds {
    fn default() -> Self {
        Self {
            open_indoor_drop_c: 0.3,
            open_outdoor_rise_c: 0.3,
            close_indoor_rise_c: 0.2,
            close_outdoor_drop_c: 0.2,
            max_step: TimeDelta::minutes(5),
        }
    }
}

impl From<&DoorConfig> for DoorThresholds {
    fn from(config: &DoorConfig) -> Self {
        Self {
            open_indoor_drop_c: config.open_indoor_drop_c,
            open_outdoor_rise_c: config.open_outdoor_rise_c,
            close_indoor_rise_c: config.close_indoor_rise_c,
            close_outdoor_drop_c: config.close_outdoor_drop_c,
            max_step: TimeDelta::try_minutes(config.max_step_minutes.max(0))
                .unwrap_or(TimeDelta::MAX),
        }
    }
}

/// Change between two consecutive paired samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub elapsed: TimeDelta,
    pub indoor_delta: f64,
    pub outdoor_delta: f64,
}

impl Step {
    pub fn between(prev: &PairedSample, curr: &PairedSample) -> Self {
        Self {
            elapsed: curr.timestamp - prev.timestamp,
            indoor_delta: curr.indoor_temp - prev.indoor_temp,
            outdoor_delta: curr.outdoor_temp - prev.outdoor_temp,
        }
    }

    /// Elapsed time clamped into `[0, max_step]`. A negative cap counts
    /// nothing.
    pub fn capped_elapsed(&self, max_step: TimeDelta) -> TimeDelta {
        self.elapsed.min(max_step).max(TimeDelta::zero())
    }

    /// Indoor falls and outdoor rises enough to suggest an opened door.
    pub fn is_open_signal(&self, t: &DoorThresholds) -> bool {
        self.indoor_delta <= -t.open_indoor_drop_c + EPSILON
            && self.outdoor_delta >= t.open_outdoor_rise_c - EPSILON
    }

    /// Indoor recovers and outdoor cools, suggesting the door was closed.
    pub fn is_close_signal(&self, t: &DoorThresholds) -> bool {
        self.indoor_delta >= t.close_indoor_rise_c - EPSILON
            && self.outdoor_delta <= -t.close_outdoor_drop_c + EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

/// Result of feeding one step to the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: DoorState,
    /// Whether the step's time counts as open time.
    pub counts_as_open: bool,
}

impl DoorState {
    pub fn step(self, step: &Step, thresholds: &DoorThresholds) -> Transition {
        match self {
            DoorState::Closed if step.is_open_signal(thresholds) => Transition {
                next: DoorState::Open,
                counts_as_open: true,
            },
            DoorState::Closed => Transition {
                next: DoorState::Closed,
                counts_as_open: false,
            },
            // The step is counted before the close check fires.
            DoorState::Open if step.is_close_signal(thresholds) => Transition {
                next: DoorState::Closed,
                counts_as_open: true,
            },
            DoorState::Open => Transition {
                next: DoorState::Open,
                counts_as_open: true,
            },
        }
    }
}

/// Open-time accumulator for one day.
#[derive(Debug, Clone)]
pub struct DoorOpenEstimator {
    thresholds: DoorThresholds,
    state: DoorState,
    open_time: TimeDelta,
}

impl DoorOpenEstimator {
    pub fn new(thresholds: DoorThresholds) -> Self {
        Self {
            thresholds,
            state: DoorState::Closed,
            open_time: TimeDelta::zero(),
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn open_time(&self) -> TimeDelta {
        self.open_time
    }

    pub fn observe(&mut self, step: &Step) {
        let transition = self.state.step(step, &self.thresholds);
        if transition.counts_as_open {
            self.open_time += step.capped_elapsed(self.thresholds.max_step);
        }
        if transition.next != self.state {
            tracing::trace!("Door {:?} -> {:?}", self.state, transition.next);
        }
        self.state = transition.next;
    }

    /// Run over one day's samples, which must be in ascending time order.
    pub fn run(thresholds: DoorThresholds, samples: &[PairedSample]) -> TimeDelta {
        let mut estimator = Self::new(thresholds);
        for pair in samples.windows(2) {
            estimator.observe(&Step::between(&pair[0], &pair[1]));
        }
        estimator.open_time
    }
}

/// Estimated door-open time for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoorOpenDay {
    pub date: NaiveDate,
    #[serde(rename = "open_minutes", serialize_with = "serialize_minutes")]
    pub open_duration: TimeDelta,
}

fn serialize_minutes<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_minutes())
}

impl fmt::Display for DoorOpenDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:02}h {:02}m",
            self.date.format("%Y-%m-%d"),
            self.open_duration.num_hours(),
            self.open_duration.num_minutes() % 60
        )
    }
}

/// Estimate per day over an ascending pair series, in date order. Days with
/// fewer than two samples get zero.
pub fn door_open_per_day(pairs: &[PairedSample], thresholds: &DoorThresholds) -> Vec<DoorOpenDay> {
    pairing::pairs_by_day(pairs)
        .into_iter()
        .map(|(date, samples)| DoorOpenDay {
            date,
            open_duration: DoorOpenEstimator::run(*thresholds, &samples),
        })
        .collect()
}
