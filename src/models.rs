//! Data models for weather readings and metric queries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MetricsError;

// ---

/// Reading payload accepted at ingestion. Identifier and timestamp are
/// assigned by the service; any client-sent values for them are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    // ---
    pub sensor_id: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
}

/// Stored weather reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    // ---
    pub id: Uuid,
    pub sensor_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    #[sqlx(rename = "recorded_at")]
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    // ---
    pub fn value_of(&self, metric: Metric) -> Option<f64> {
        // ---
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::WindSpeed => self.wind_speed,
        }
    }
}

/// A numeric field of a [`Reading`] that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    WindSpeed,
}

impl FromStr for Metric {
    type Err = MetricsError;

    /// Case-insensitive; unknown names fail with `InvalidMetric`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        // ---
        match name.to_ascii_lowercase().as_str() {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "windspeed" => Ok(Metric::WindSpeed),
            _ => Err(MetricsError::InvalidMetric(name.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::WindSpeed => "windSpeed",
        };
        f.write_str(name)
    }
}

/// Reduction applied to the values of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Average,
    Min,
    Max,
    Sum,
}

impl Statistic {
    /// Total over all strings: `min`, `max` and `sum` match case-insensitively,
    /// anything else (including typos such as `median`) means `Average`.
    pub fn parse(name: &str) -> Self {
        // ---
        match name.to_ascii_lowercase().as_str() {
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            "sum" => Statistic::Sum,
            "average" => Statistic::Average,
            other => {
                tracing::warn!("Unrecognized statistic '{}', using average", other);
                Statistic::Average
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "average",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Sum => "sum",
        }
    }

    /// Reduce `values`, order independent.
    ///
    /// Returns `None` only for `min`/`max` over no values; `sum` and
    /// `average` of nothing are `0.0`. Averages are rounded to one decimal.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        // ---
        match self {
            Statistic::Min => values.iter().copied().reduce(f64::min),
            Statistic::Max => values.iter().copied().reduce(f64::max),
            Statistic::Sum => Some(values.iter().sum()),
            Statistic::Average => {
                if values.is_empty() {
                    return Some(0.0);
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Some(round_one_decimal(mean))
            }
        }
    }
}

/// Round half up (towards positive infinity) to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Parameters of one metrics query, as received from the caller.
#[derive(Debug, Clone)]
pub struct MetricRequest {
    // ---
    pub sensor_ids: Vec<String>,
    pub metric_names: Vec<String>,
    pub statistic: Statistic,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Metric name as requested (case preserved) to computed value.
pub type MetricResult = BTreeMap<String, f64>;
