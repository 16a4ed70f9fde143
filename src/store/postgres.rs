//! PostgreSQL reading store backed by the `sensor_readings` table.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ReadingStore;
use crate::{NewReading, Reading};

// ---

#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    // ---
    async fn query(
        &self,
        sensor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reading>> {
        // ---
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, sensor_id, temperature, humidity, wind_speed, recorded_at
            FROM sensor_readings
            WHERE sensor_id = $1
              AND recorded_at BETWEEN $2 AND $3
            "#,
        )
        .bind(sensor_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query readings for sensor '{}'", sensor_id))?;

        tracing::debug!("Fetched {} readings for sensor {}", rows.len(), sensor_id);
        Ok(rows)
    }

    async fn save(&self, reading: NewReading, timestamp: DateTime<Utc>) -> anyhow::Result<Reading> {
        // ---
        let stored = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO sensor_readings (
                id, sensor_id, temperature, humidity, wind_speed, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sensor_id, temperature, humidity, wind_speed, recorded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&reading.sensor_id)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.wind_speed)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
        .context("Failed to store reading")?;

        Ok(stored)
    }
}
