//! In-process reading store, selected with `STORE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ReadingStore;
use crate::{NewReading, Reading};

// ---

#[derive(Debug, Default)]
pub struct MemoryReadingStore {
    readings: RwLock<Vec<Reading>>,
}

impl MemoryReadingStore {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already-stamped readings as-is, e.g. to seed historical data.
    pub async fn insert_all(&self, readings: impl IntoIterator<Item = Reading>) {
        self.readings.write().await.extend(readings);
    }

    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    // ---
    async fn query(
        &self,
        sensor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reading>> {
        // ---
        let readings = self.readings.read().await;
        Ok(readings
            .iter()
            .filter(|r| r.sensor_id == sensor_id)
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect())
    }

    async fn save(&self, reading: NewReading, timestamp: DateTime<Utc>) -> anyhow::Result<Reading> {
        // ---
        let stored = Reading {
            id: Uuid::new_v4(),
            sensor_id: reading.sensor_id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            wind_speed: reading.wind_speed,
            timestamp,
        };
        self.readings.write().await.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_reading(sensor_id: &str, temperature: f64) -> NewReading {
        // ---
        NewReading {
            sensor_id: sensor_id.to_string(),
            temperature: Some(temperature),
            humidity: None,
            wind_speed: None,
        }
    }

    #[test]
    fn test_save_assigns_id_and_timestamp() {
        // ---
        let store = MemoryReadingStore::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(tokio_test::block_on(store.is_empty()));

        let first = tokio_test::block_on(store.save(new_reading("s1", 20.0), at)).unwrap();
        let second = tokio_test::block_on(store.save(new_reading("s1", 21.0), at)).unwrap();

        assert_eq!(first.timestamp, at);
        assert_ne!(first.id, second.id);
        assert_eq!(tokio_test::block_on(store.len()), 2);
    }

    #[tokio::test]
    async fn test_query_bounds_are_inclusive() {
        // ---
        let store = MemoryReadingStore::new();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(2);

        for at in [
            start - Duration::seconds(1),
            start,
            start + Duration::hours(1),
            end,
            end + Duration::seconds(1),
        ] {
            store.save(new_reading("s1", 1.0), at).await.unwrap();
        }
        store.save(new_reading("s2", 1.0), start).await.unwrap();

        let found = store.query("s1", start, end).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.sensor_id == "s1"));
        assert!(store.query("s3", start, end).await.unwrap().is_empty());
    }
}
