//! Abstractions over the reading store to enable testing.
//!
//! `ReadingStore` is the only seam between the analyses and persistence:
//! seeding writes through it once, and the front end reads the full snapshot
//! back through it. `MemoryStore` stands in for the database in tests.

use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use anyhow::Result;

use crate::reading::Reading;

/// Persistent set of validated readings.
pub trait ReadingStore: Send + Sync {
    /// Whether the store holds no readings at all.
    fn is_empty(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Number of stored readings.
    fn count(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Insert readings in one batch, returning how many were written.
    fn insert_readings(&self, readings: &[Reading]) -> impl Future<Output = Result<u64>> + Send;

    /// Every stored reading, ordered by timestamp.
    fn all_readings(&self) -> impl Future<Output = Result<Vec<Reading>>> + Send;
}

/// In-memory store for testing that records insert batches.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Arc<Mutex<Vec<Reading>>>,
    insert_calls: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `readings`.
    pub fn with_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
            insert_calls: Arc::default(),
        }
    }

    /// Number of `insert_readings` calls so far.
    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }
}

impl ReadingStore for MemoryStore {
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.readings.lock().unwrap().is_empty())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.readings.lock().unwrap().len() as u64)
    }

    async fn insert_readings(&self, readings: &[Reading]) -> Result<u64> {
        *self.insert_calls.lock().unwrap() += 1;
        self.readings.lock().unwrap().extend_from_slice(readings);
        Ok(readings.len() as u64)
    }

    async fn all_readings(&self) -> Result<Vec<Reading>> {
        let mut readings = self.readings.lock().unwrap().clone();
        readings.sort_by_key(|r| (r.timestamp, r.location));
        Ok(readings)
    }
}
