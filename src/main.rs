//! Application entry point for the `weathersensor-metrics` service.
//!
//! This binary orchestrates the startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Selecting the reading store (PostgreSQL pool plus schema, or in-memory)
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `STORE_BACKEND` (optional) – `postgres` (default) or `memory`
//! - `DATABASE_URL` (**required** for `postgres`) – PostgreSQL connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `LISTEN_PORT` (optional) – HTTP port (default: 8080)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use weathersensor_metrics::{
    config, routes, schema, MemoryReadingStore, MetricsEngine, PgReadingStore, ReadingStore,
    StoreBackend,
};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let store: Arc<dyn ReadingStore> = match &cfg.store {
        StoreBackend::Postgres {
            db_url,
            db_pool_max,
        } => {
            tracing::info!("Attempting to connect to database");

            let pool = PgPoolOptions::new()
                .max_connections(*db_pool_max)
                .connect(db_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

            tracing::info!("Successfully connected to database");

            schema::create_schema(&pool).await?;
            Arc::new(PgReadingStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory reading store; readings are lost on restart");
            Arc::new(MemoryReadingStore::new())
        }
    };

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(MetricsEngine::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, else the `AXUM_LOG_LEVEL` env var
///
/// Called once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn,tower_http=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
