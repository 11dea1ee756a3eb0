//! Configuration management for the Odoo MCP Server
//!
//! Handles environment variables and configuration loading.

use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default port for the HTTP API
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address for the HTTP API
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default XML-RPC request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Odoo MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection defaults used when a connect request omits a parameter
    pub odoo: OdooDefaults,

    /// HTTP API bind address
    pub host: String,

    /// HTTP API port
    pub port: u16,

    /// Timeout applied to every XML-RPC request
    pub request_timeout: Duration,
}

/// Connection parameters taken from the environment
#[derive(Debug, Clone, Default)]
pub struct OdooDefaults {
    pub url: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Create a new configuration from the process environment
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let odoo = OdooDefaults {
            url: get(env::URL),
            database: get(env::DATABASE),
            username: get(env::USERNAME),
            password: get(env::PASSWORD),
        };

        let host = get(env::HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(env::PORT) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: env::PORT.to_string(),
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get(env::TIMEOUT_SECS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: env::TIMEOUT_SECS.to_string(),
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            odoo,
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Socket address string for the HTTP API
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odoo: OdooDefaults::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Environment variable names
pub mod env {
    pub const URL: &str = "ODOO_URL";
    pub const DATABASE: &str = "ODOO_DATABASE";
    pub const USERNAME: &str = "ODOO_USERNAME";
    pub const PASSWORD: &str = "ODOO_PASSWORD";
    pub const TIMEOUT_SECS: &str = "ODOO_TIMEOUT_SECS";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
}

/// Odoo XML-RPC endpoint paths
pub mod odoo {
    /// Service exposing `authenticate` and `version`
    pub const COMMON_PATH: &str = "/xmlrpc/2/common";

    /// Service exposing `execute_kw`
    pub const OBJECT_PATH: &str = "/xmlrpc/2/object";

    /// Default record limit for searches
    pub const DEFAULT_LIMIT: u32 = 100;
}
