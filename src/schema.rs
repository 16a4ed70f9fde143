//! Database schema management for `weathersensor-metrics`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` when the PostgreSQL backend is used.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema (idempotent).
///
/// Creates the `sensor_readings` table and the index backing the per-sensor
/// time range lookup. Safe to call on every startup.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Readings are append-only; recorded_at is always server-assigned
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_readings (
            id          UUID             PRIMARY KEY,
            sensor_id   TEXT             NOT NULL,
            temperature DOUBLE PRECISION,
            humidity    DOUBLE PRECISION,
            wind_speed  DOUBLE PRECISION,
            recorded_at TIMESTAMPTZ      NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_sensor_time
            ON sensor_readings (sensor_id, recorded_at);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
