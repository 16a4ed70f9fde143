//! Metrics engine: ingestion and aggregate queries over the reading store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::store::ReadingStore;
use crate::window::{DateBounds, Window};
use crate::{Metric, MetricRequest, MetricResult, MetricsError, NewReading, Reading, Statistic};

// ---

#[derive(Clone)]
pub struct MetricsEngine {
    store: Arc<dyn ReadingStore>,
}

impl MetricsEngine {
    // ---
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Stamp `reading` with the current instant and persist it.
    pub async fn ingest(&self, reading: NewReading) -> Result<Reading, MetricsError> {
        // ---
        let stored = self.store.save(reading, Utc::now()).await?;
        debug!("Stored reading {} for sensor {}", stored.id, stored.sensor_id);
        Ok(stored)
    }

    pub async fn compute_metrics(&self, request: &MetricRequest) -> Result<MetricResult, MetricsError> {
        self.compute_metrics_at(request, Utc::now()).await
    }

    /// Answer `request` with `now` as the reference instant.
    ///
    /// Steps, each aborting the whole request on failure:
    /// 1. resolve and validate the window
    /// 2. parse every metric name
    /// 3. fetch readings for all sensors into one pool
    /// 4. reduce each metric's non-null values under the statistic
    pub async fn compute_metrics_at(
        &self,
        request: &MetricRequest,
        now: DateTime<Utc>,
    ) -> Result<MetricResult, MetricsError> {
        // ---
        let window = DateBounds::from_options(request.start_date, request.end_date).resolve(now)?;

        let metrics = request
            .metric_names
            .iter()
            .map(|name| name.parse::<Metric>().map(|metric| (name, metric)))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = self.fetch_pool(&request.sensor_ids, &window).await?;
        debug!(
            "Pooled {} readings from {} sensors",
            pool.len(),
            request.sensor_ids.len()
        );

        let result = metrics
            .into_iter()
            .map(|(name, metric)| {
                reduce_metric(&pool, metric, request.statistic).map(|value| (name.clone(), value))
            })
            .collect::<Result<MetricResult, _>>()?;

        info!(
            "Computed {} of {:?} over [{}, {}]",
            request.statistic.as_str(),
            request.metric_names,
            window.start(),
            window.end()
        );
        Ok(result)
    }

    /// Query every sensor concurrently and merge the results.
    async fn fetch_pool(
        &self,
        sensor_ids: &[String],
        window: &Window,
    ) -> Result<Vec<Reading>, MetricsError> {
        // ---
        let per_sensor = try_join_all(
            sensor_ids
                .iter()
                .map(|id| self.store.query(id, window.start(), window.end())),
        )
        .await?;

        Ok(per_sensor.into_iter().flatten().collect())
    }
}

/// Reduce one metric over the pool, skipping readings where it is null.
fn reduce_metric(
    pool: &[Reading],
    metric: Metric,
    statistic: Statistic,
) -> Result<f64, MetricsError> {
    // ---
    let values: Vec<f64> = pool.iter().filter_map(|r| r.value_of(metric)).collect();

    statistic
        .reduce(&values)
        .ok_or_else(|| MetricsError::EmptyReduction {
            metric: metric.to_string(),
            statistic: statistic.as_str(),
        })
}
