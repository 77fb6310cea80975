//! Service configuration.
//!
//! Serde-backed config structs with defaults, overridable from
//! environment variables at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port for REST endpoints.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Fixed time-to-live for cache writes, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// TTL as a `Duration`.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Event-stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Topic receiving portfolio-updated events.
    #[serde(default = "default_updates_topic")]
    pub portfolio_updates_topic: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            portfolio_updates_topic: default_updates_topic(),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Event-stream settings.
    #[serde(default)]
    pub events: EventsConfig,
    /// Base URL of the user service.
    #[serde(default = "default_user_service_url")]
    pub user_service_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            events: EventsConfig::default(),
            user_service_base_url: default_user_service_url(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env_parsed("PORTFOLIO_HTTP_PORT") {
            config.server.http_port = port;
        }
        if let Ok(address) = std::env::var("PORTFOLIO_BIND_ADDRESS") {
            config.server.bind_address = address;
        }
        if let Some(ttl) = env_parsed("PORTFOLIO_CACHE_TTL_SECS") {
            config.cache.ttl_secs = ttl;
        }
        if let Ok(topic) = std::env::var("PORTFOLIO_UPDATES_TOPIC") {
            config.events.portfolio_updates_topic = topic;
        }
        if let Ok(url) = std::env::var("USER_SERVICE_BASE_URL") {
            config.user_service_base_url = url;
        }

        config
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}

const fn default_http_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_updates_topic() -> String {
    "portfolio-updates".to_string()
}

fn default_user_service_url() -> String {
    "http://localhost:8081".to_string()
}
