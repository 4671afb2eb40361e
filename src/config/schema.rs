//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the index.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Outbound client settings for proxy routes.
    pub upstream: UpstreamConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Route key (URL path prefix, may contain placeholders) to backend.
    pub routes: BTreeMap<String, RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host or IP to bind.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Per-request deadline enforced by the HTTP layer, in seconds.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// `host:port`, suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 300,
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum idle time between reads from upstream in seconds.
    pub read_timeout_secs: u64,

    /// Upstream bodies with a declared length up to this size are buffered;
    /// everything else is streamed.
    pub buffer_limit_bytes: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            buffer_limit_bytes: 1024 * 1024,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One route table entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Backend kind.
    pub source: RouteSource,

    /// Target template: a path relative to the config file for `path`,
    /// an absolute URL otherwise.
    pub to: String,
}

/// Backend kinds a route can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Serve from the local filesystem.
    Path,
    /// Redirect clients to the `to` URL.
    #[serde(alias = "redirect")]
    Http,
    /// Fetch the `to` URL and relay the answer.
    Proxy,
}
