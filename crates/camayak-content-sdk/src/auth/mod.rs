//! Content API credentials and request signing.
//!
//! Camayak authenticates Content API requests with two query parameters:
//!
//! - `api_key` - the key of the Content API publishing destination
//! - `api_sig` - present only when the destination has a shared secret; the
//!   hex-encoded HMAC-SHA1 of `<unix timestamp><api_key>` keyed by the secret
//!
//! The signature embeds the current time, so it is derived fresh for every
//! outbound request and never cached. Camayak tolerates a small clock-skew
//! window around the timestamp.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;
use zeroize::Zeroizing;

use crate::error::SigningError;

type HmacSha1 = Hmac<Sha1>;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Query parameter carrying the request signature.
pub const API_SIG_PARAM: &str = "api_sig";

// ============================================================================
// Credentials
// ============================================================================

/// Credentials of a Content API publishing destination.
///
/// Immutable once constructed. The shared secret is wiped from memory on drop
/// and never appears in `Debug` output.
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::auth::Credentials;
///
/// let unsigned = Credentials::new("my-api-key");
/// assert!(!unsigned.has_shared_secret());
///
/// let signed = Credentials::new("my-api-key").with_shared_secret("s3cret");
/// assert!(signed.has_shared_secret());
/// ```
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    shared_secret: Option<Zeroizing<String>>,
}

impl Credentials {
    /// Create credentials without a shared secret; requests carry no `api_sig`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            shared_secret: None,
        }
    }

    /// Attach the destination's shared secret.
    ///
    /// An empty secret is treated as absent, matching how Camayak treats an
    /// unset secret on the publishing destination.
    pub fn with_shared_secret(mut self, shared_secret: impl Into<String>) -> Self {
        let secret = shared_secret.into();
        self.shared_secret = if secret.is_empty() {
            None
        } else {
            Some(Zeroizing::new(secret))
        };
        self
    }

    /// The destination API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether requests made with these credentials are signed.
    pub fn has_shared_secret(&self) -> bool {
        self.shared_secret.is_some()
    }

    pub(crate) fn shared_secret(&self) -> Option<&str> {
        self.shared_secret.as_ref().map(|s| s.as_str())
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field(
                "shared_secret",
                &self.shared_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

// ============================================================================
// Signer
// ============================================================================

/// Sign a Content API request at the current wall-clock time.
///
/// Returns the hex-encoded HMAC-SHA1 of `<unix seconds><api_key>` keyed by
/// `shared_secret`.
pub fn sign(api_key: &str, shared_secret: &str) -> Result<String, SigningError> {
    sign_at(api_key, shared_secret, Utc::now().timestamp())
}

/// Sign a Content API request for a fixed Unix timestamp (seconds).
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::auth::sign_at;
///
/// let sig = sign_at("my-api-key", "s3cret", 1_700_000_000).unwrap();
/// assert_eq!(sig.len(), 40);
/// assert_eq!(sig, sign_at("my-api-key", "s3cret", 1_700_000_000).unwrap());
/// ```
pub fn sign_at(api_key: &str, shared_secret: &str, timestamp: i64) -> Result<String, SigningError> {
    let mut mac = HmacSha1::new_from_slice(shared_secret.as_bytes()).map_err(|e| {
        SigningError::InvalidKey {
            message: format!("Failed to create HMAC instance: {}", e),
        }
    })?;

    mac.update(timestamp.to_string().as_bytes());
    mac.update(api_key.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ============================================================================
// Signed Request Parameters
// ============================================================================

/// Authentication query parameters for one outbound Content API request.
///
/// Derive a new value for every request; the signature is only valid around
/// the moment it was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestParams {
    api_key: String,
    api_sig: Option<String>,
}

impl SignedRequestParams {
    /// Derive parameters for a request made now.
    pub fn now(credentials: &Credentials) -> Result<Self, SigningError> {
        Self::at(credentials, Utc::now().timestamp())
    }

    /// Derive parameters for a request made at `timestamp` (Unix seconds).
    ///
    /// # Examples
    ///
    /// ```
    /// use camayak_content_sdk::auth::{Credentials, SignedRequestParams};
    ///
    /// let params = SignedRequestParams::at(&Credentials::new("key"), 1_700_000_000).unwrap();
    /// assert_eq!(params.api_sig(), None);
    /// ```
    pub fn at(credentials: &Credentials, timestamp: i64) -> Result<Self, SigningError> {
        let api_sig = credentials
            .shared_secret()
            .map(|secret| sign_at(credentials.api_key(), secret, timestamp))
            .transpose()?;

        Ok(Self {
            api_key: credentials.api_key().to_string(),
            api_sig,
        })
    }

    /// The `api_key` value.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The `api_sig` value, if the credentials carry a shared secret.
    pub fn api_sig(&self) -> Option<&str> {
        self.api_sig.as_deref()
    }

    /// Append the parameters to a URL's query string.
    ///
    /// Existing query parameters are preserved.
    pub fn append_to(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        query.append_pair(API_KEY_PARAM, &self.api_key);
        if let Some(sig) = &self.api_sig {
            query.append_pair(API_SIG_PARAM, sig);
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
