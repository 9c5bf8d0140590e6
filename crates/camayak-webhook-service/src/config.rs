//! Configuration types for the HTTP service
//!
//! Sources, later overriding earlier:
//!
//! 1. `/etc/camayak/service.yaml` (optional)
//! 2. `./config/service.yaml` (optional)
//! 3. the file named by `CAMAYAK_CONFIG_FILE` (required when set)
//! 4. `CAMAYAK__`-prefixed environment variables, `__` separated,
//!    e.g. `CAMAYAK__SERVER__PORT=8080` sets `server.port`
//! 5. `CAMAYAK_API_KEY` and `CAMAYAK_SHARED_SECRET`
//!
//! Every field has a serde default, so an unconfigured environment yields the
//! built-in defaults; only `content_api.api_key` must be supplied.

use std::time::Duration;

use camayak_content_sdk::client::DEFAULT_CONTENT_API_URL;
use camayak_content_sdk::{ApiError, ClientConfig, ContentClient, Credentials};
use serde::Deserialize;
use tracing::info;

use crate::errors::ConfigError;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "CAMAYAK_CONFIG_FILE";

/// Flat environment variable overriding `content_api.api_key`.
pub const API_KEY_ENV: &str = "CAMAYAK_API_KEY";

/// Flat environment variable overriding `content_api.shared_secret`.
pub const SHARED_SECRET_ENV: &str = "CAMAYAK_SHARED_SECRET";

const ENV_PREFIX: &str = "CAMAYAK";

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Content API credentials and client settings
    pub content_api: ContentApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from the layered file and environment sources.
    ///
    /// The result is not validated; call [`ServiceConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(
                config::File::with_name("/etc/camayak/service")
                    .required(false)
                    .format(config::FileFormat::Yaml),
            )
            .add_source(
                config::File::with_name("config/service")
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );

        if let Some(explicit_path) = non_empty_env(CONFIG_FILE_ENV) {
            info!(path = %explicit_path, "Loading configuration from explicit path");
            builder = builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override_option("content_api.api_key", non_empty_env(API_KEY_ENV))?
            .set_override_option("content_api.shared_secret", non_empty_env(SHARED_SECRET_ENV))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check the values that cannot be caught by deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_api.api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "content_api.api_key".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        url::Url::parse(&self.content_api.endpoint).map_err(|e| ConfigError::Invalid {
            message: format!(
                "content_api.endpoint '{}' is not a valid URL: {}",
                self.content_api.endpoint, e
            ),
        })?;

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl ServerConfig {
    /// `host:port` string handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Content API credentials and client settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ContentApiConfig {
    /// API key issued for the publishing destination
    pub api_key: String,

    /// Shared secret for request signing; empty means unsigned requests
    pub shared_secret: Option<String>,

    /// Content collection endpoint
    pub endpoint: String,

    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent override for outbound requests
    pub user_agent: Option<String>,
}

impl ContentApiConfig {
    /// Credentials for request signing.
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(self.api_key.clone());
        match &self.shared_secret {
            Some(secret) => credentials.with_shared_secret(secret.clone()),
            None => credentials,
        }
    }

    /// SDK client settings derived from this section.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default()
            .with_content_api_url(self.endpoint.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds));

        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        }
    }

    /// Build the Content API client used for every webhook resource fetch.
    pub fn build_client(&self) -> Result<ContentClient, ApiError> {
        ContentClient::builder(self.credentials())
            .config(self.client_config())
            .build()
    }
}

impl Default for ContentApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            shared_secret: None,
            endpoint: DEFAULT_CONTENT_API_URL.to_string(),
            timeout_seconds: 30,
            user_agent: None,
        }
    }
}

impl std::fmt::Debug for ContentApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentApiConfig")
            .field("api_key", &self.api_key)
            .field(
                "shared_secret",
                &self.shared_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
