//! # Configuration Management for RedisHaus
//!
//! This crate provides centralized configuration structures for all RedisHaus components:
//! the Redis connection used by the template and the defaults applied by the cache manager.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{CacheConfig, RedisConfig};
//!
//! let redis_config = RedisConfig::new("localhost".to_string(), 6379, 4);
//! let cache_config = CacheConfig::default().with_time_to_live(120);
//! assert_eq!(redis_config.connection_url(), "redis://localhost:6379/4");
//! assert_eq!(cache_config.entry_ttl().as_secs(), 120);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [redis]
//! host = "localhost"
//! port = 6379
//! database = 4
//! password = "secret"
//! key_prefix = "app:"
//! connection_timeout_ms = 3000
//!
//! [cache]
//! time_to_live_seconds = 60
//! cache_null_values = false
//! use_key_prefix = true
//!
//! [cache.ttl_overrides]
//! users = 300
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from redishaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./redishaus.toml";
const CONFIG_PATH_VAR: &str = "REDISHAUS_CONFIG";

/// Entry TTL used when the cache section leaves it unset or zero
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(60);

/// Highest logical database index of a stock Redis server
const MAX_DATABASE_INDEX: u8 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Redis connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: u8,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Namespace prepended to every key written through the template
    pub key_prefix: Option<String>,
    pub connection_timeout_ms: u64,
}

/// Cache manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry TTL in seconds; `None` or `0` falls back to [`DEFAULT_TIME_TO_LIVE`]
    pub time_to_live_seconds: Option<u64>,
    pub cache_null_values: bool,
    pub use_key_prefix: bool,
    /// Prefix placed before `{cache}::` when `use_key_prefix` is set
    pub key_prefix: Option<String>,
    /// Per-cache TTL in seconds, keyed by cache name
    pub ttl_overrides: HashMap<String, u64>,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            // A missing .env file is fine, a malformed one is not
            match dotenvy::dotenv() {
                Ok(_) => {}
                Err(err) if err.not_found() => {}
                Err(err) => return Err(err.into()),
            }

            if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
                Self::from_file(&config_path)
            } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as {} or in {} file",
                    CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Redis validations
        if self.redis.host.is_empty() {
            return Err(ConfigError::Invalid("Redis host cannot be empty".to_string()));
        }
        if self.redis.port == 0 {
            return Err(ConfigError::Invalid("Redis port cannot be zero".to_string()));
        }
        if self.redis.database > MAX_DATABASE_INDEX {
            return Err(ConfigError::Invalid(format!(
                "Redis database must be between 0 and {}",
                MAX_DATABASE_INDEX
            )));
        }
        if self.redis.connection_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Redis connection_timeout_ms must be greater than 0".to_string(),
            ));
        }

        // Cache validations
        if let Some((name, _)) = self.cache.ttl_overrides.iter().find(|(_, ttl)| **ttl == 0) {
            return Err(ConfigError::Invalid(format!(
                "Cache ttl override for '{}' must be greater than 0",
                name
            )));
        }

        Ok(())
    }
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl RedisConfig {
    /// Create a new Redis configuration
    pub fn new(host: String, port: u16, database: u8) -> Self {
        Self {
            host,
            port,
            database,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: Option<String>, password: String) -> Self {
        self.username = username;
        self.password = Some(password);
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: &str) -> Self {
        self.key_prefix = Some(key_prefix.to_string());
        self
    }

    pub fn with_connection_timeout(mut self, timeout_ms: u64) -> Self {
        self.connection_timeout_ms = timeout_ms;
        self
    }

    /// Build connection string
    pub fn connection_url(&self) -> String {
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", user, pass),
            (Some(user), None) => format!("{}@", user),
            (None, Some(pass)) => format!(":{}@", pass),
            (None, None) => String::new(),
        };
        format!(
            "redis://{}{}:{}/{}",
            auth, self.host, self.port, self.database
        )
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            database: 0,
            username: None,
            password: None,
            key_prefix: None,
            connection_timeout_ms: 5000,
        }
    }
}

impl CacheConfig {
    pub fn with_time_to_live(mut self, seconds: u64) -> Self {
        self.time_to_live_seconds = Some(seconds);
        self
    }

    pub fn with_ttl_override(mut self, cache_name: &str, seconds: u64) -> Self {
        self.ttl_overrides.insert(cache_name.to_string(), seconds);
        self
    }

    pub fn with_null_values(mut self, cache_null_values: bool) -> Self {
        self.cache_null_values = cache_null_values;
        self
    }

    /// Default entry TTL as Duration
    pub fn entry_ttl(&self) -> Duration {
        match self.time_to_live_seconds {
            Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
            _ => DEFAULT_TIME_TO_LIVE,
        }
    }

    /// Entry TTL for a named cache, honoring per-cache overrides
    pub fn ttl_for(&self, cache_name: &str) -> Duration {
        self.ttl_overrides
            .get(cache_name)
            .map(|seconds| Duration::from_secs(*seconds))
            .unwrap_or_else(|| self.entry_ttl())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            time_to_live_seconds: None,
            cache_null_values: false,
            use_key_prefix: true,
            key_prefix: None,
            ttl_overrides: HashMap::new(),
        }
    }
}
