//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::ServiceId;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Base URL of every backend service.
    pub services: ServicesConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream connection pool limits.
    pub pool: PoolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions. Empty means the built-in `/api/v1` table.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests handled concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Backend base URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub user: String,
    pub catalog: String,
    pub rating: String,
    pub playlist: String,
}

impl ServicesConfig {
    pub fn url_for(&self, id: ServiceId) -> &str {
        match id {
            ServiceId::User => &self.user,
            ServiceId::Catalog => &self.catalog,
            ServiceId::Rating => &self.rating,
            ServiceId::Playlist => &self.playlist,
        }
    }

    pub fn set_url(&mut self, id: ServiceId, url: String) {
        match id {
            ServiceId::User => self.user = url,
            ServiceId::Catalog => self.catalog = url,
            ServiceId::Rating => self.rating = url,
            ServiceId::Playlist => self.playlist = url,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            user: "http://localhost:8001".to_string(),
            catalog: "http://localhost:8002".to_string(),
            rating: "http://localhost:8003".to_string(),
            playlist: "http://localhost:8004".to_string(),
        }
    }
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins echoed back in `Access-Control-Allow-Origin` (exact match).
    pub allowed_origins: Vec<String>,

    /// Rendered, in order, into `Access-Control-Allow-Methods`.
    pub allowed_methods: Vec<String>,

    /// Rendered, in order, into `Access-Control-Allow-Headers`.
    pub allowed_headers: Vec<String>,

    /// `Access-Control-Max-Age` in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:8080".to_string(),
            ],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: ["Content-Type", "Authorization", "X-Requested-With"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_age_secs: 86_400,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for an upstream to return response headers, in seconds.
    pub request_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,

    /// Grace period for in-flight requests after a shutdown signal, in seconds.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
            drain_secs: 30,
        }
    }
}

/// Upstream pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle keep-alive connections kept per service.
    pub max_idle_per_service: usize,

    /// Upper bound on concurrent exchanges with one service.
    pub max_connections_per_service: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_service: 32,
            max_connections_per_service: 256,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    #[serde(default)]
    pub name: Option<String>,

    /// Path prefix to match.
    pub path_prefix: String,

    /// Methods the rule applies to. Empty = all.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Service to forward to.
    pub service: ServiceId,

    /// Whether a bearer credential is required.
    #[serde(default)]
    pub requires_auth: bool,
}
