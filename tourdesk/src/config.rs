//! Service configuration
//!
//! Layered with figment: compiled defaults, then `config.toml`, then
//! `TOURDESK_`-prefixed environment variables. Nested keys use `_` in the
//! environment form, so `TOURDESK_SERVICE_PORT=8080` overrides
//! `service.port`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP service settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, used in logs and the health response
    #[serde(default = "default_name")]
    pub name: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
    /// Maximum request body size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl ServiceConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Request body size cap in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout_secs(),
            environment: Environment::default(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory of `{collection}.json` files loaded at startup
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

/// Deployment environment; steers log format and error diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl Config {
    /// Load from `config.toml` in the working directory plus the environment
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load with an explicit config file path
    pub fn load_from(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("TOURDESK_").split("_"))
            .extract()?;
        Ok(config)
    }
}

fn default_name() -> String {
    "tourdesk".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_body_limit_mb() -> usize {
    2
}
