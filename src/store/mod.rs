//! Reading store collaborator.
//!
//! The engine only sees [`ReadingStore`]; `main.rs` picks the backend from
//! configuration. Both backends are safe to share between concurrent
//! requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{NewReading, Reading};

mod memory;
mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

// ---

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// All readings of `sensor_id` with `start <= timestamp <= end`, unordered.
    async fn query(
        &self,
        sensor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reading>>;

    /// Persist `reading` stamped with `timestamp`; the store assigns the id.
    async fn save(&self, reading: NewReading, timestamp: DateTime<Utc>) -> anyhow::Result<Reading>;
}
