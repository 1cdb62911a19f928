//! Plain-text and JSON rendering of analysis results.
//!
//! Values arrive unrounded from the analyses; rounding to
//! `display.decimals` happens here and nowhere else.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    analytics::{DailyValue, DatasetSummary, SortOrder},
    config::DisplayConfig,
    door::DoorOpenDay,
    reading::Location,
    seed::SeedOutcome,
};

/// Quantity shown by a daily ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    MoldRisk,
    Divergence,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "mean temperature",
            Metric::Humidity => "mean humidity",
            Metric::MoldRisk => "mold risk",
            Metric::Divergence => "indoor/outdoor divergence",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature | Metric::Divergence => "°C",
            Metric::Humidity | Metric::MoldRisk => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub top_n: usize,
    pub decimals: usize,
}

impl From<&DisplayConfig> for ReportStyle {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            top_n: config.top_n,
            decimals: config.decimals,
        }
    }
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "lowest first",
        SortOrder::Descending => "highest first",
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn truncation_note(out: &mut String, shown: usize, total: usize) {
    if total > shown {
        let _ = writeln!(out, "... ({total} days total)");
    }
}

/// Render the first `style.top_n` entries of a daily ranking.
pub fn format_ranking(
    metric: Metric,
    location: Option<Location>,
    order: SortOrder,
    values: &[DailyValue],
    style: ReportStyle,
) -> String {
    let mut out = String::new();
    let title = match location {
        Some(location) => format!("{} {}, {}", location, metric.label(), direction(order)),
        None => format!("Days by {}, {}", metric.label(), direction(order)),
    };
    heading(&mut out, &title);

    if values.is_empty() {
        let _ = writeln!(out, "No data");
        return out;
    }

    let decimals = style.decimals;
    for (rank, day) in values.iter().take(style.top_n).enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  {:>8.decimals$} {}",
            rank + 1,
            day.date.format("%Y-%m-%d"),
            day.value,
            metric.unit()
        );
    }
    truncation_note(&mut out, style.top_n.min(values.len()), values.len());
    out
}

pub fn format_mean_temperature(
    date: NaiveDate,
    location: Location,
    mean: Option<f64>,
    decimals: usize,
) -> String {
    match mean {
        Some(mean) => format!(
            "{} mean temperature on {}: {:.decimals$} °C\n",
            location,
            date.format("%Y-%m-%d"),
            mean
        ),
        None => format!(
            "No {} readings on {}\n",
            location.as_str().to_lowercase(),
            date.format("%Y-%m-%d")
        ),
    }
}

/// Render door-open estimates, longest first as given.
pub fn format_door_ranking(days: &[DoorOpenDay], top_n: usize) -> String {
    let mut out = String::new();
    heading(&mut out, "Estimated balcony door open time per day");

    if days.is_empty() {
        let _ = writeln!(out, "No paired samples");
        return out;
    }

    for day in days.iter().take(top_n) {
        let _ = writeln!(out, "{day}");
    }
    truncation_note(&mut out, top_n.min(days.len()), days.len());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonOnsets {
    pub autumn: Option<NaiveDate>,
    pub winter: Option<NaiveDate>,
}

pub fn format_seasons(onsets: &SeasonOnsets) -> String {
    fn line(name: &str, onset: Option<NaiveDate>) -> String {
        match onset {
            Some(date) => format!("Meteorological {name} began {}\n", date.format("%Y-%m-%d")),
            None => format!("Meteorological {name} not reached in the data\n"),
        }
    }

    let mut out = line("autumn", onsets.autumn);
    out.push_str(&line("winter", onsets.winter));
    out
}

pub fn format_summary(summary: &DatasetSummary) -> String {
    let span = match (summary.first_day, summary.last_day) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "no days".to_string(),
    };
    format!(
        "{} readings ({} indoor, {} outdoor) over {} days, {}\n",
        summary.readings, summary.indoor, summary.outdoor, summary.days, span
    )
}

pub fn format_seed_outcome(outcome: &SeedOutcome) -> String {
    match outcome {
        SeedOutcome::AlreadySeeded { existing } => {
            format!("Database already holds {existing} readings, nothing imported\n")
        }
        SeedOutcome::Seeded { inserted, report } => format!(
            "Imported {inserted} readings from {} rows ({} duplicates, {} rejected)\n",
            report.rows,
            report.duplicates,
            report.rejected()
        ),
        SeedOutcome::NothingToSeed { report } => format!(
            "No valid readings found ({} rows, {} rejected)\n",
            report.rows,
            report.rejected()
        ),
    }
}

/// Pretty-printed JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}
