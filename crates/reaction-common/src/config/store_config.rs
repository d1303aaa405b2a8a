//! Reaction store configuration
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub executor: ExecutorSettings,
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Primary (read/write) connection URL
    pub url: String,
    /// Replica connection URL for cacheable reads; falls back to the primary
    #[serde(default)]
    pub replica_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Reaction cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of messages kept in the cache
    #[serde(default = "default_cache_size")]
    pub capacity: usize,
    /// Seconds an entry stays fresh after insertion
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheSettings {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_size(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Task executor settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSettings {
    /// Maximum number of store operations running at once
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_cache_size() -> usize {
    20_000
}

fn default_cache_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_max_in_flight() -> usize {
    64
}

impl StoreSettings {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable
    /// cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseSettings {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                replica_url: lookup("DATABASE_REPLICA_URL").filter(|s| !s.trim().is_empty()),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            cache: CacheSettings {
                capacity: parse_var(&lookup, "REACTION_CACHE_SIZE")?
                    .unwrap_or_else(default_cache_size),
                ttl_secs: parse_var(&lookup, "REACTION_CACHE_TTL_SECS")?
                    .unwrap_or_else(default_cache_ttl_secs),
            },
            executor: ExecutorSettings {
                max_in_flight: parse_var(&lookup, "REACTION_MAX_IN_FLIGHT")?
                    .unwrap_or_else(default_max_in_flight),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
