//! `GET /api/sensors/metrics`: aggregate metrics over a time window.
//!
//! Query parameters:
//! - `sensorId` (required, repeatable or comma-separated)
//! - `metrics` (required, repeatable or comma-separated)
//! - `statistic` (`average` | `min` | `max` | `sum`, default `average`;
//!   unrecognized values also mean `average`)
//! - `startDate`, `endDate` (`yyyy-MM-dd` as local midnight, or RFC 3339)
//!
//! Failures are reported three ways. A missing start date with an end date,
//! or malformed parameters, is rejected with 400 and the message as text.
//! Engine failures answer 400 with `{"<message>": NaN}`, which JSON renders as
//! `null`. Store failures answer 500.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{Disposition, MetricRequest, MetricsEngine, MetricsError, Statistic};

// ---

pub fn router() -> Router<MetricsEngine> {
    // ---
    Router::new().route("/api/sensors/metrics", get(handler))
}

async fn handler(
    Query(params): Query<Vec<(String, String)>>,
    State(engine): State<MetricsEngine>,
) -> Response {
    // ---
    info!("GET /api/sensors/metrics - {:?}", params);

    let request = match parse_request(&params) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected metrics query: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };
    debug!("GET /api/sensors/metrics - parsed {:?}", request);

    match engine.compute_metrics(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: MetricsError) -> Response {
    // ---
    match err.disposition() {
        Disposition::Rejection => {
            warn!("Rejected metrics query: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Disposition::Soft => {
            info!("Metrics query failed: {}", err);
            let body: BTreeMap<String, f64> = BTreeMap::from([(err.to_string(), f64::NAN)]);
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Disposition::Internal => {
            error!("Metrics query failed: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An exception occurred: {}", err),
            )
                .into_response()
        }
    }
}

/// Malformed query parameters, rejected before the engine runs.
#[derive(Debug, Error, PartialEq)]
enum QueryError {
    #[error("Required parameter '{0}' is not present")]
    MissingParameter(&'static str),

    #[error("Invalid {param} '{value}': expected yyyy-MM-dd or RFC 3339")]
    InvalidDate { param: &'static str, value: String },
}

fn parse_request(params: &[(String, String)]) -> Result<MetricRequest, QueryError> {
    // ---
    let sensor_ids = list_param(params, "sensorId")?;
    let metric_names = list_param(params, "metrics")?;

    let statistic = single_param(params, "statistic")
        .map(Statistic::parse)
        .unwrap_or_default();

    let start_date = date_param(params, "startDate")?;
    let end_date = date_param(params, "endDate")?;

    Ok(MetricRequest {
        sensor_ids,
        metric_names,
        statistic,
        start_date,
        end_date,
    })
}

/// Collect every occurrence of `name`, splitting comma-separated values.
fn list_param(params: &[(String, String)], name: &'static str) -> Result<Vec<String>, QueryError> {
    // ---
    let values: Vec<String> = params
        .iter()
        .filter(|(key, _)| key == name)
        .flat_map(|(_, value)| value.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();

    if values.is_empty() {
        return Err(QueryError::MissingParameter(name));
    }
    Ok(values)
}

/// First non-blank occurrence of `name`.
fn single_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
        .find(|v| !v.is_empty())
}

fn date_param(
    params: &[(String, String)],
    name: &'static str,
) -> Result<Option<DateTime<Utc>>, QueryError> {
    // ---
    single_param(params, name)
        .map(|value| {
            parse_date(value).ok_or_else(|| QueryError::InvalidDate {
                param: name,
                value: value.to_string(),
            })
        })
        .transpose()
}

/// `yyyy-MM-dd` is midnight in the system's local zone.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    // ---
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_and_comma_separated_lists() {
        // ---
        let p = params(&[
            ("sensorId", "s1,s2"),
            ("sensorId", "s3"),
            ("metrics", "temperature"),
            ("metrics", "humidity, windSpeed"),
        ]);
        let request = parse_request(&p).unwrap();

        assert_eq!(request.sensor_ids, vec!["s1", "s2", "s3"]);
        assert_eq!(
            request.metric_names,
            vec!["temperature", "humidity", "windSpeed"]
        );
        assert_eq!(request.statistic, Statistic::Average);
        assert_eq!(request.start_date, None);
        assert_eq!(request.end_date, None);
    }

    #[test]
    fn test_missing_required_lists() {
        // ---
        let err = parse_request(&params(&[("metrics", "temperature")])).unwrap_err();
        assert_eq!(err, QueryError::MissingParameter("sensorId"));

        let err = parse_request(&params(&[("sensorId", "s1"), ("metrics", "")])).unwrap_err();
        assert_eq!(err, QueryError::MissingParameter("metrics"));
    }

    #[test]
    fn test_statistic_parameter() {
        // ---
        let p = params(&[("sensorId", "s1"), ("metrics", "temperature"), ("statistic", "MAX")]);
        assert_eq!(parse_request(&p).unwrap().statistic, Statistic::Max);

        let p = params(&[("sensorId", "s1"), ("metrics", "temperature"), ("statistic", "median")]);
        assert_eq!(parse_request(&p).unwrap().statistic, Statistic::Average);
    }

    #[test]
    fn test_rfc3339_dates() {
        // ---
        let start = parse_date("2025-03-01T10:00:00Z").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());

        let offset = parse_date("2025-03-01T10:00:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_plain_dates_are_local_midnight() {
        // ---
        let parsed = parse_date("2025-03-01").unwrap().with_timezone(&Local);
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(parsed.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        // ---
        let p = params(&[
            ("sensorId", "s1"),
            ("metrics", "temperature"),
            ("startDate", "03/01/2025"),
        ]);
        let err = parse_request(&p).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidDate {
                param: "startDate",
                value: "03/01/2025".to_string()
            }
        );
    }
}
