// src/routes/health.rs
//! Liveness endpoint for the weather sensor service.
//!
//! `GET /health` lets orchestrators and CI check the process answers HTTP.
//! It never touches the reading store, so a healthy response says nothing
//! about database reachability.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Subrouter with the `/health` route, generic over the gateway's state.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
