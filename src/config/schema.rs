//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default movie-metadata API origin.
pub const DEFAULT_API_ORIGIN: &str = "https://api.themoviedb.org";

/// Default plugin catalog origin.
pub const DEFAULT_PLUGIN_ORIGIN: &str = "https://emby.media/emby/PluginCatalog";

/// Cache lifetime advertised on proxied API responses.
pub const API_CACHE_TTL_SECS: u64 = 600;

/// Cache lifetime advertised on proxied plugin catalog responses.
pub const PLUGIN_CACHE_TTL_SECS: u64 = 600;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Movie-metadata API upstream.
    pub api: ApiConfig,

    /// Plugin catalog upstream.
    pub plugin: PluginConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for the inbound and outbound legs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed until upstream response headers arrive, in seconds.
    pub upstream_secs: u64,

    /// Outer limit on handling an inbound request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { system_proxy: true }
    }
}

/// Movie-metadata API upstream (`/3/*`, `/4/*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin the request path is appended to.
    pub origin: String,

    /// User-Agent sent on every forwarded request.
    pub user_agent: String,

    /// Accept header forced on every forwarded request, if any.
    pub accept: Option<String>,

    /// `max-age` advertised in the relayed `Cache-Control` header.
    pub cache_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_API_ORIGIN.to_string(),
            user_agent: "Mozilla/5.0 (compatible; Cf-tmdb-Proxy/1.0)".to_string(),
            accept: Some("application/json".to_string()),
            cache_max_age_secs: API_CACHE_TTL_SECS,
        }
    }
}

/// Plugin catalog upstream (`/plugin/*`).
///
/// The origin usually carries a base path; the `/plugin` prefix of the
/// inbound path is replaced by it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginConfig {
    pub origin: String,
    pub user_agent: String,
    pub accept: Option<String>,
    pub cache_max_age_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_PLUGIN_ORIGIN.to_string(),
            user_agent: "Mozilla/5.0 (compatible; Cf-emby-Proxy/1.0)".to_string(),
            accept: None,
            cache_max_age_secs: PLUGIN_CACHE_TTL_SECS,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
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
