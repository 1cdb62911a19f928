use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    reading::{Location, Reading},
    traits::ReadingStore,
};

/// A row of the `readings` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingRow {
    /// Populated by SQLx.
    #[allow(dead_code)]
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub location: String,
    pub temperature_c: f64,
    pub humidity_pct: i64,
}

impl ReadingRow {
    /// Convert to a domain reading, `None` if the row holds an unknown
    /// location.
    pub fn reading(&self) -> Option<Reading> {
        let location = Location::from_str(&self.location).ok()?;
        Some(Reading::new(
            self.timestamp,
            location,
            self.temperature_c,
            self.humidity_pct.clamp(0, 100) as u8,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true);

        // Every connection to an in-memory database gets its own database,
        // so those must share a single connection that is never recycled.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }

    /// Open a fresh in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    pub async fn count_readings(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readings")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count readings")?;
        Ok(count as u64)
    }

    /// Insert readings inside a single transaction.
    pub async fn insert_batch(&self, readings: &[Reading]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        for reading in readings {
            sqlx::query(
                "INSERT INTO readings (timestamp, location, temperature_c, humidity_pct) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(reading.timestamp)
            .bind(reading.location.as_str())
            .bind(reading.temperature_c)
            .bind(i64::from(reading.humidity_pct))
            .execute(&mut *tx)
            .await
            .context("Failed to insert reading")?;
        }

        tx.commit().await.context("Failed to commit readings")?;
        Ok(readings.len() as u64)
    }

    pub async fn fetch_all(&self) -> Result<Vec<Reading>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT id, timestamp, location, temperature_c, humidity_pct
            FROM readings
            ORDER BY timestamp ASC, location ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch readings")?;

        let total = rows.len();
        let readings: Vec<Reading> = rows.iter().filter_map(ReadingRow::reading).collect();
        if readings.len() < total {
            tracing::warn!(
                "Ignored {} stored rows with an unknown location",
                total - readings.len()
            );
        }
        Ok(readings)
    }
}

impl ReadingStore for Database {
    async fn is_empty(&self) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar("SELECT id FROM readings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to probe readings table")?;
        Ok(row.is_none())
    }

    async fn count(&self) -> Result<u64> {
        self.count_readings().await
    }

    async fn insert_readings(&self, readings: &[Reading]) -> Result<u64> {
        self.insert_batch(readings).await
    }

    async fn all_readings(&self) -> Result<Vec<Reading>> {
        self.fetch_all().await
    }
}
