//! Camayak Content API client for signed read operations.
//!
//! This module provides the [`ContentClient`] used both by applications (to
//! list or fetch assignments directly) and by the webhook router (to fetch the
//! resource named in an inbound event). Every request carries a freshly
//! derived `api_key`/`api_sig` query; see [`crate::auth`].
//!
//! Responses are returned as raw body text. Callers decide how to parse it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::{Credentials, SignedRequestParams};
use crate::error::ApiError;

/// Default Content API collection endpoint.
pub const DEFAULT_CONTENT_API_URL: &str = "https://content.camayak.com/v1/content/";

/// Configuration for Content API client behavior.
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_content_api_url("http://localhost:9000/v1/content/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Content API collection endpoint; single assignments live at `<endpoint><id>/`
    pub content_api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("camayak-content-sdk/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            content_api_url: DEFAULT_CONTENT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the Content API collection endpoint.
    pub fn with_content_api_url(mut self, url: impl Into<String>) -> Self {
        self.content_api_url = url.into();
        self
    }
}

/// Extra query parameters for [`ContentClient::list`].
///
/// Parameters are appended after the authentication parameters in insertion
/// order.
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::client::ListOptions;
///
/// let options = ListOptions::new().param("page", "2");
/// assert_eq!(options.params(), &[("page".to_string(), "2".to_string())]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    params: Vec<(String, String)>,
}

impl ListOptions {
    /// Create empty list options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// The configured query parameters.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Client for the Camayak Content API.
///
/// Cheap to clone; clones share the underlying connection pool and the
/// immutable credentials.
///
/// # Examples
///
/// ```no_run
/// # use camayak_content_sdk::client::{ContentClient, ListOptions};
/// # use camayak_content_sdk::auth::Credentials;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("my-api-key").with_shared_secret("my-secret");
/// let client = ContentClient::builder(credentials).build()?;
///
/// let listing = client.list(&ListOptions::new()).await?;
/// let assignment = client.get("7f1c0b6e").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContentClient {
    credentials: Arc<Credentials>,
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl ContentClient {
    /// Create a new builder for constructing a Content API client.
    pub fn builder(credentials: Credentials) -> ContentClientBuilder {
        ContentClientBuilder::new(credentials)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the credentials used to sign requests.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// List assignments available to the publishing destination.
    ///
    /// Issues `GET <endpoint>?api_key=...&api_sig=...` followed by any extra
    /// parameters from `options`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if no response was received
    /// - `ApiError::HttpStatus` if the status is outside `[200, 300)`
    /// - `ApiError::InvalidUrl` if the configured endpoint is not a URL
    #[instrument(skip(self, options))]
    pub async fn list(&self, options: &ListOptions) -> Result<String, ApiError> {
        let mut url = self.signed_url(&self.config.content_api_url)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in options.params() {
                query.append_pair(key, value);
            }
        }

        self.send_get(url).await
    }

    /// Fetch a single assignment by identifier.
    ///
    /// Issues `GET <endpoint><id>/?api_key=...&api_sig=...`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::list`].
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<String, ApiError> {
        let base = self.config.content_api_url.trim_end_matches('/');
        let url = self.signed_url(&format!("{}/{}/", base, id))?;

        self.send_get(url).await
    }

    /// Fetch the resource named by a webhook event's `resource_uri`.
    ///
    /// The signed query is appended to whatever query the URI already has.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::list`].
    #[instrument(skip(self))]
    pub async fn fetch_resource(&self, resource_uri: &str) -> Result<String, ApiError> {
        let url = self.signed_url(resource_uri)?;

        self.send_get(url).await
    }

    /// Parse `base` and append freshly signed authentication parameters.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidUrl` if `base` is not an absolute URL
    /// - `ApiError::Signing` if the signature cannot be computed
    pub fn signed_url(&self, base: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(base).map_err(|e| ApiError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })?;

        SignedRequestParams::now(&self.credentials)?.append_to(&mut url);

        Ok(url)
    }

    async fn send_get(&self, url: Url) -> Result<String, ApiError> {
        debug!(host = ?url.host_str(), path = %url.path(), "Sending Content API request");

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Keep the status even when the body cannot be read.
            let body = response.text().await.unwrap_or_default();
            warn!(status_code = status.as_u16(), "Content API request failed");
            return Err(ApiError::HttpStatus {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Builder for constructing `ContentClient` instances.
#[derive(Debug)]
pub struct ContentClientBuilder {
    credentials: Credentials,
    config: Option<ClientConfig>,
}

impl ContentClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            config: None,
        }
    }

    /// Set the client configuration.
    ///
    /// If not set, uses `ClientConfig::default()`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the Content API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the HTTP client cannot be created.
    pub fn build(self) -> Result<ContentClient, ApiError> {
        let config = self.config.unwrap_or_default();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(ContentClient {
            credentials: Arc::new(self.credentials),
            http_client,
            config,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
