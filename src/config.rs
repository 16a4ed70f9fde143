//! Configuration loader for the `weathersensor-metrics` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional port-sized environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Where readings are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given connection string.
    Postgres { db_url: String, db_pool_max: u32 },
    /// Process memory; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Postgres,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "memory" => Ok(BackendKind::Memory),
            other => Err(anyhow!(
                "Invalid STORE_BACKEND: '{}' (expected 'postgres' or 'memory')",
                other
            )),
        }
    }
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Reading store backend.
    pub store: StoreBackend,

    /// TCP port the HTTP server binds on all interfaces.
    pub listen_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `STORE_BACKEND` – `postgres` or `memory` (default: `postgres`)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `LISTEN_PORT` – HTTP port (default: 8080)
///
/// Required with the `postgres` backend:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let kind = match env::var("STORE_BACKEND") {
        Ok(v) => v.parse::<BackendKind>()?,
        Err(_) => BackendKind::Postgres,
    };

    let store = match kind {
        BackendKind::Postgres => StoreBackend::Postgres {
            db_url: require_env!("DATABASE_URL"),
            db_pool_max: parse_env_u32!("DB_POOL_MAX", 5),
        },
        BackendKind::Memory => StoreBackend::Memory,
    };
    let listen_port = parse_env_u16!("LISTEN_PORT", 8080);

    Ok(Config { store, listen_port })
}

/// Mask the password component of a database URL (`user:****@host`).
fn mask_db_url(db_url: &str) -> String {
    // ---
    let Some(at_pos) = db_url.rfind('@') else {
        return db_url.to_string();
    };
    match db_url[..at_pos].rfind(':') {
        // Only a password colon sits after the scheme's "//"
        Some(colon_pos) if db_url[..colon_pos].contains("//") => {
            format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..])
        }
        _ => db_url.to_string(),
    }
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        match &self.store {
            StoreBackend::Postgres {
                db_url,
                db_pool_max,
            } => {
                tracing::info!("  STORE_BACKEND : postgres");
                tracing::info!("  DATABASE_URL  : {}", mask_db_url(db_url));
                tracing::info!("  DB_POOL_MAX   : {}", db_pool_max);
            }
            StoreBackend::Memory => {
                tracing::info!("  STORE_BACKEND : memory");
            }
        }
        tracing::info!("  LISTEN_PORT   : {}", self.listen_port);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_password_is_masked() {
        // ---
        assert_eq!(
            mask_db_url("postgres://weather:s3cret@db:5432/readings"),
            "postgres://weather:****@db:5432/readings"
        );
    }

    #[test]
    fn test_url_without_password_is_unchanged() {
        // ---
        assert_eq!(
            mask_db_url("postgres://weather@db/readings"),
            "postgres://weather@db/readings"
        );
        assert_eq!(
            mask_db_url("postgres://localhost/readings"),
            "postgres://localhost/readings"
        );
    }

    #[test]
    fn test_backend_kind_parsing() {
        // ---
        assert_eq!(
            "postgres".parse::<BackendKind>().unwrap(),
            BackendKind::Postgres
        );
        assert_eq!("Memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("sqlite".parse::<BackendKind>().is_err());
    }
}
