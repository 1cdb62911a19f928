//! One-time seeding of the reading store from a CSV export.
//!
//! Seeding only happens while the store is empty, so running it on every
//! start is safe and never duplicates readings.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::{
    ingest::{self, IngestReport},
    traits::ReadingStore,
};

/// What a seeding attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeedOutcome {
    /// The store already held readings and was left untouched.
    AlreadySeeded { existing: u64 },
    /// The store was empty and the validated readings were written.
    Seeded { inserted: u64, report: IngestReport },
    /// The store was empty and the source produced no valid readings.
    NothingToSeed { report: IngestReport },
}

/// Seed `store` from the CSV file at `csv_path` if the store is empty.
pub async fn seed_if_empty<S: ReadingStore>(store: &S, csv_path: &Path) -> Result<SeedOutcome> {
    if !store.is_empty().await? {
        let existing = store.count().await?;
        tracing::info!("Store already holds {} readings, skipping seed", existing);
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    let ingested = ingest::load_csv_file(csv_path);
    seed_readings(store, ingested).await
}

/// Seed `store` from CSV text if the store is empty.
pub async fn seed_from_str<S: ReadingStore>(store: &S, csv: &str) -> Result<SeedOutcome> {
    if !store.is_empty().await? {
        let existing = store.count().await?;
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    seed_readings(store, ingest::parse_csv_str(csv)).await
}

async fn seed_readings<S: ReadingStore>(
    store: &S,
    ingested: ingest::Ingested,
) -> Result<SeedOutcome> {
    if ingested.readings.is_empty() {
        tracing::warn!("No valid readings to seed");
        return Ok(SeedOutcome::NothingToSeed {
            report: ingested.report,
        });
    }

    let inserted = store.insert_readings(&ingested.readings).await?;
    tracing::info!("Seeded store with {} readings", inserted);
    Ok(SeedOutcome::Seeded {
        inserted,
        report: ingested.report,
    })
}
