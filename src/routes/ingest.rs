//! `POST /api/sensors/data`: store one reading.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use tracing::{error, info};

use crate::{MetricsEngine, NewReading};

// ---

pub fn router() -> Router<MetricsEngine> {
    // ---
    Router::new().route("/api/sensors/data", post(handler))
}

async fn handler(
    State(engine): State<MetricsEngine>,
    Json(reading): Json<NewReading>,
) -> impl IntoResponse {
    // ---
    info!("POST /api/sensors/data - sensor {}", reading.sensor_id);

    match engine.ingest(reading).await {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(e) => {
            error!("Failed to store reading: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An exception occurred: {}", e),
            )
                .into_response()
        }
    }
}
