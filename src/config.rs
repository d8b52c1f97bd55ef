//! Start-up configuration.
//!
//! Configuration is read once, before any store is constructed, and decides
//! which task store variant the process uses. Values come from environment
//! variables:
//!
//! - `TASKS_STORE`: `postgres` (default) or `memory`
//! - `DATABASE_URL`: connection string, required for `postgres`
//! - `TASKS_DB_POOL_SIZE`: connection pool size, default 10

use std::num::NonZeroU32;
use thiserror::Error;

/// Environment variable selecting the store variant.
pub const STORE_VAR: &str = "TASKS_STORE";
/// Environment variable holding the `PostgreSQL` connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASKS_DB_POOL_SIZE";

const DEFAULT_POOL_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        key: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Store variant and its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Durable `PostgreSQL` store.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Maximum number of pooled connections.
        pool_size: NonZeroU32,
    },
    /// Ephemeral in-memory store, discarded with the process.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Selected task store.
    pub store: StoreConfig,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let variant = lookup(STORE_VAR).unwrap_or_else(|| "postgres".to_owned());
        let store = match variant.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "postgres" => {
                let database_url = lookup(DATABASE_URL_VAR)
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::MissingVar(DATABASE_URL_VAR))?;
                let pool_size = parse_pool_size(lookup(POOL_SIZE_VAR))?;
                StoreConfig::Postgres {
                    database_url,
                    pool_size,
                }
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: STORE_VAR,
                    value: variant,
                    reason: "expected 'postgres' or 'memory'",
                });
            }
        };
        Ok(Self { store })
    }
}

fn parse_pool_size(raw: Option<String>) -> Result<NonZeroU32, ConfigError> {
    let Some(value) = raw else {
        return Ok(DEFAULT_POOL_SIZE);
    };
    value
        .trim()
        .parse::<NonZeroU32>()
        .map_err(|_| ConfigError::InvalidValue {
            key: POOL_SIZE_VAR,
            value,
            reason: "expected a positive integer",
        })
}
