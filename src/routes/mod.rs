//! Router gateway: merges the per-endpoint subrouters and attaches state.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::MetricsEngine;

mod health;
mod ingest;
mod metrics;

// ---

pub fn router(engine: MetricsEngine) -> Router {
    // ---
    Router::new()
        .merge(ingest::router())
        .merge(metrics::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
