//! Indoor Climate Library
//!
//! This module exposes the core components of the indoor climate analyzer
//! for testing and potential reuse.

pub mod analytics;
pub mod config;
pub mod db;
pub mod door;
pub mod ingest;
pub mod mold;
pub mod pairing;
pub mod reading;
pub mod report;
pub mod season;
pub mod seed;
pub mod traits;

// Re-export commonly used types
pub use analytics::{
    DailyValue,
    DatasetSummary,
    SortOrder,
    // Single-day queries
    mean_temperature,
    // Rankings
    ranked_by_divergence,
    ranked_by_door_open_duration,
    ranked_by_mean_humidity,
    ranked_by_mean_temperature,
    ranked_by_mold_risk,
    summarize,
};
pub use db::Database;
pub use door::{DoorOpenDay, DoorOpenEstimator, DoorState, DoorThresholds};
pub use ingest::{IngestReport, Ingested, RowError};
pub use pairing::{PairedSample, pair_by_timestamp};
pub use reading::{Location, Reading};
pub use season::{Season, autumn_onset, winter_onset};
pub use seed::{SeedOutcome, seed_if_empty};
pub use traits::{MemoryStore, ReadingStore};
