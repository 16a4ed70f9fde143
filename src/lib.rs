//! Weather sensor ingestion and aggregate metrics service.
//!
//! Readings (temperature, humidity, wind speed) are ingested per sensor with a
//! server-assigned timestamp. Metric queries reduce one or more metrics over a
//! validated time window across one or more sensors.
//!
//! This crate follows the Explicit Module Boundary Pattern (EMBP): this file is
//! the gateway, route modules import shared types from `crate::` only and
//! never reach into sibling modules directly.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod window;

pub use config::{Config, StoreBackend};
pub use engine::MetricsEngine;
pub use error::{Disposition, MetricsError};
pub use models::{Metric, MetricRequest, MetricResult, NewReading, Reading, Statistic};
pub use store::{MemoryReadingStore, PgReadingStore, ReadingStore};
pub use window::{DateBounds, Window};
