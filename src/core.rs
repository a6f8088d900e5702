//! Core RedisHaus functionality
//!
//! This module contains the main RedisHaus struct, which wires the template,
//! the typed façade, the cache manager and the cache key generator from one
//! [`AppConfig`].

use std::fmt::Debug;
use std::sync::Arc;

use cache_system::debug_log;
use cache_system::{
    CacheManager, KeyGenerator, KeySerializer, RedisTemplate, RedisUtils, SimpleKeyGenerator,
    ValueSerializer,
};
use config::AppConfig;

use crate::errors::RedisHausError;

/// Main RedisHaus coordinator owning every Redis-facing component
#[derive(Clone)]
pub struct RedisHaus {
    config: Arc<AppConfig>,
    template: Arc<RedisTemplate>,
    utils: RedisUtils,
    cache_manager: CacheManager,
    key_generator: Arc<dyn KeyGenerator>,
}

impl Debug for RedisHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisHaus")
            .field("template", &self.template)
            .field("cache_manager", &self.cache_manager)
            .field("key_generator", &self.key_generator)
            .finish()
    }
}

impl RedisHaus {
    /// Create RedisHaus with the default serializers and key generator
    pub fn new(config: AppConfig) -> Result<Self, RedisHausError> {
        Self::builder(config).build()
    }

    /// Create RedisHaus from `redishaus.toml` (or `$REDISHAUS_CONFIG`)
    pub fn from_env() -> Result<Self, RedisHausError> {
        Self::new(AppConfig::load()?)
    }

    /// Start a builder for overriding individual components
    pub fn builder(config: AppConfig) -> RedisHausBuilder {
        RedisHausBuilder::new(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared template, for commands the façade does not wrap
    pub fn template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }

    /// Typed command façade
    pub fn utils(&self) -> &RedisUtils {
        &self.utils
    }

    pub fn cache_manager(&self) -> &CacheManager {
        &self.cache_manager
    }

    pub fn key_generator(&self) -> &dyn KeyGenerator {
        self.key_generator.as_ref()
    }

    /// Ping the server, returning its reply
    pub async fn health_check(&self) -> Result<String, RedisHausError> {
        Ok(self.template.ping().await?)
    }
}

/// Builder for [`RedisHaus`]; unset components fall back to the defaults
pub struct RedisHausBuilder {
    config: AppConfig,
    key_serializer: Option<Arc<dyn KeySerializer>>,
    hash_key_serializer: Option<Arc<dyn KeySerializer>>,
    value_serializer: Option<Arc<dyn ValueSerializer>>,
    key_generator: Option<Arc<dyn KeyGenerator>>,
}

impl RedisHausBuilder {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            key_serializer: None,
            hash_key_serializer: None,
            value_serializer: None,
            key_generator: None,
        }
    }

    pub fn key_serializer(mut self, serializer: Arc<dyn KeySerializer>) -> Self {
        self.key_serializer = Some(serializer);
        self
    }

    pub fn hash_key_serializer(mut self, serializer: Arc<dyn KeySerializer>) -> Self {
        self.hash_key_serializer = Some(serializer);
        self
    }

    pub fn value_serializer(mut self, serializer: Arc<dyn ValueSerializer>) -> Self {
        self.value_serializer = Some(serializer);
        self
    }

    pub fn key_generator(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.key_generator = Some(generator);
        self
    }

    /// Validate the configuration and assemble every component
    ///
    /// No connection is opened here; the first command connects lazily.
    pub fn build(self) -> Result<RedisHaus, RedisHausError> {
        self.config.validate()?;

        let mut template = RedisTemplate::new(self.config.redis.clone())?;
        if let Some(serializer) = self.key_serializer {
            template = template.with_key_serializer(serializer);
        }
        if let Some(serializer) = self.hash_key_serializer {
            template = template.with_hash_key_serializer(serializer);
        }
        if let Some(serializer) = self.value_serializer {
            template = template.with_value_serializer(serializer);
        }
        let template = Arc::new(template);

        debug_log!(
            "RedisHaus configured for {}:{} db {}",
            self.config.redis.host,
            self.config.redis.port,
            self.config.redis.database
        );

        Ok(RedisHaus {
            utils: RedisUtils::new(Arc::clone(&template)),
            cache_manager: CacheManager::new(Arc::clone(&template), self.config.cache.clone()),
            key_generator: self
                .key_generator
                .unwrap_or_else(|| Arc::new(SimpleKeyGenerator)),
            config: Arc::new(self.config),
            template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cache_system::StringKeySerializer;
    use config::RedisConfig;

    #[test]
    fn test_new_uses_defaults() {
        let haus = RedisHaus::new(AppConfig::default()).unwrap();
        assert_eq!(haus.template().config().port, 6379);
        assert_eq!(haus.key_generator().generate("T", "m", &[&1]), "Tm1");
    }

    #[test]
    fn test_builder_overrides_key_serializer() {
        let haus = RedisHaus::builder(AppConfig::default())
            .key_serializer(Arc::new(StringKeySerializer::with_prefix("svc:")))
            .build()
            .unwrap();
        assert_eq!(haus.template().raw_key("a"), b"svc:a".to_vec());
    }

    #[test]
    fn test_prefix_comes_from_config() {
        let config = AppConfig {
            redis: RedisConfig::default().with_key_prefix("app:"),
            ..AppConfig::default()
        };
        let haus = RedisHaus::new(config).unwrap();
        assert_eq!(haus.template().raw_key("k"), b"app:k".to_vec());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AppConfig {
            redis: RedisConfig::new(String::new(), 6379, 0),
            ..AppConfig::default()
        };
        assert!(matches!(
            RedisHaus::new(config),
            Err(RedisHausError::Config(_))
        ));
    }
}
