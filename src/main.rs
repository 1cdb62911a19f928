use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indoor_climate::{
    analytics::{self, SortOrder},
    config::AppConfig,
    db::Database,
    door::DoorThresholds,
    reading::{Location, Reading},
    report::{self, Metric, ReportStyle, SeasonOnsets},
    season,
    seed::{self, SeedOutcome},
    traits::ReadingStore,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "indoor-climate")]
#[command(about = "Indoor and outdoor temperature and humidity analytics")]
struct Args {
    /// CSV export used to seed an empty database
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Number of days shown per ranking
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the CSV export if the database is empty
    Seed,
    /// Mean temperature for one day
    MeanTemp {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_enum, default_value_t = Location::Indoor)]
        location: Location,
    },
    /// Days ranked by mean temperature
    Temperature {
        #[arg(long, value_enum, default_value_t = Location::Outdoor)]
        location: Location,
        #[arg(long, value_enum, default_value_t = SortOrder::Descending)]
        order: SortOrder,
    },
    /// Days ranked by mean humidity
    Humidity {
        #[arg(long, value_enum, default_value_t = Location::Outdoor)]
        location: Location,
        #[arg(long, value_enum, default_value_t = SortOrder::Ascending)]
        order: SortOrder,
    },
    /// Days ranked by share of samples in the mold risk zone
    Mold {
        #[arg(long, value_enum, default_value_t = Location::Indoor)]
        location: Location,
        #[arg(long, value_enum, default_value_t = SortOrder::Descending)]
        order: SortOrder,
    },
    /// Days ranked by mean indoor/outdoor temperature difference
    Divergence {
        #[arg(long, value_enum, default_value_t = SortOrder::Descending)]
        order: SortOrder,
    },
    /// Days ranked by estimated balcony door open time
    Door,
    /// Onset dates of meteorological autumn and winter
    Seasons,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only results
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "indoor_climate=debug".to_string()),
        );

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(csv) = args.csv.clone() {
        config.data.csv_path = csv;
    }
    if let Some(top) = args.top {
        config.display.top_n = top;
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let (outcome, readings) = rt.block_on(async {
        tracing::info!("Connecting to database...");
        let database = Database::new(&config.database.url).await?;
        tracing::info!("Database connected successfully");

        let outcome = seed::seed_if_empty(&database, &config.data.csv_path).await?;
        let readings = database.all_readings().await?;
        tracing::info!("Loaded {} readings", readings.len());
        Ok::<_, anyhow::Error>((outcome, readings))
    })?;

    let output = run_command(&args, &config, &outcome, &readings)?;
    print!("{output}");
    Ok(())
}

fn run_command(
    args: &Args,
    config: &AppConfig,
    outcome: &SeedOutcome,
    readings: &[Reading],
) -> Result<String> {
    let style = ReportStyle::from(&config.display);
    let ranking = |metric, location, order, values: Vec<analytics::DailyValue>| {
        if args.json {
            report::to_json(&values[..style.top_n.min(values.len())])
        } else {
            Ok(report::format_ranking(metric, location, order, &values, style))
        }
    };

    match args.command {
        Command::Seed => {
            let summary = analytics::summarize(readings);
            if args.json {
                report::to_json(&serde_json::json!({
                    "outcome": outcome,
                    "summary": summary,
                }))
            } else {
                Ok(format!(
                    "{}{}",
                    report::format_seed_outcome(outcome),
                    report::format_summary(&summary)
                ))
            }
        }
        Command::MeanTemp { date, location } => {
            let mean = analytics::mean_temperature(readings, date, location);
            if args.json {
                report::to_json(&serde_json::json!({
                    "date": date,
                    "location": location,
                    "mean_temperature_c": mean,
                }))
            } else {
                Ok(report::format_mean_temperature(
                    date,
                    location,
                    mean,
                    style.decimals,
                ))
            }
        }
        Command::Temperature { location, order } => ranking(
            Metric::Temperature,
            Some(location),
            order,
            analytics::ranked_by_mean_temperature(readings, location, order),
        ),
        Command::Humidity { location, order } => ranking(
            Metric::Humidity,
            Some(location),
            order,
            analytics::ranked_by_mean_humidity(readings, location, order),
        ),
        Command::Mold { location, order } => ranking(
            Metric::MoldRisk,
            Some(location),
            order,
            analytics::ranked_by_mold_risk(readings, location, order),
        ),
        Command::Divergence { order } => ranking(
            Metric::Divergence,
            None,
            order,
            analytics::ranked_by_divergence(readings, order),
        ),
        Command::Door => {
            let thresholds = DoorThresholds::from(&config.door);
            let days = analytics::ranked_by_door_open_duration(readings, &thresholds);
            if args.json {
                report::to_json(&days[..style.top_n.min(days.len())])
            } else {
                Ok(report::format_door_ranking(&days, style.top_n))
            }
        }
        Command::Seasons => {
            let onsets = SeasonOnsets {
                autumn: season::autumn_onset(readings),
                winter: season::winter_onset(readings),
            };
            if args.json {
                report::to_json(&onsets)
            } else {
                Ok(report::format_seasons(&onsets))
            }
        }
    }
}
