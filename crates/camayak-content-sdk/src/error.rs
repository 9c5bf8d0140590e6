//! Error types for Camayak Content SDK operations.
//!
//! This module defines the error types used throughout the SDK. Content API
//! client failures are reported as [`ApiError`]; everything the webhook router
//! hands to the application's error handler is a [`WebhookError`].

use thiserror::Error;

use crate::webhook::EventKind;

/// Errors during request signing.
///
/// HMAC accepts keys of any length, so these only surface if the underlying
/// MAC implementation rejects the shared secret.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The shared secret could not be used as an HMAC key.
    #[error("Invalid signing key: {message}")]
    InvalidKey { message: String },
}

/// Errors during Content API operations.
///
/// These errors represent failures when communicating with the Camayak
/// Content API: network failures, non-2xx responses, and request construction
/// problems.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, timeout).
    #[error("Content API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Content API answered with a status outside `[200, 300)`.
    #[error("Content API returned HTTP {status_code}: {body}")]
    HttpStatus { status_code: u16, body: String },

    /// The request URL could not be constructed.
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The request signature could not be computed.
    #[error("Request signing failed: {0}")]
    Signing(#[from] SigningError),

    /// The HTTP client could not be created.
    #[error("Client configuration error: {message}")]
    Configuration { message: String },
}

impl ApiError {
    /// HTTP status code returned by the Content API, if the request got that far.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Failures routed to the application's error handler.
///
/// The event router never lets a failure escape to the HTTP layer. Each of
/// these is handed to [`ContentHandler::error`](crate::webhook::ContentHandler::error)
/// together with the responder for the inbound request, and by default becomes
/// an HTTP 500 that Camayak retries.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The Content API could not be reached for the event's resource.
    ///
    /// Carries the underlying cause: a network failure, a missing or invalid
    /// `resource_uri`, or a signing failure.
    #[error("Failed to fetch content: {0}")]
    Transport(#[source] ApiError),

    /// The Content API answered the resource fetch with a non-2xx status.
    #[error("Content API returned HTTP {status_code}")]
    Api { status_code: u16, body: String },

    /// The Content API response was not a JSON object.
    #[error("Unable to parse content api response")]
    Parse { message: String },

    /// The inbound webhook carried no recognised event type, or was not JSON.
    #[error("Unknown event type")]
    UnknownEvent { event: Option<String> },

    /// The fetched content does not support the requested transition.
    ///
    /// Raised for a retract event on content that was never published.
    #[error("Unexpected state: {event} event for content without a published_id")]
    UnexpectedState { event: EventKind },
}

impl WebhookError {
    /// HTTP status code returned by the Content API, for [`WebhookError::Api`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Short machine-readable category, used in serialized failure bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Api { .. } => "api",
            Self::Parse { .. } => "parse",
            Self::UnknownEvent { .. } => "unknown_event",
            Self::UnexpectedState { .. } => "unexpected_state",
        }
    }
}

impl From<ApiError> for WebhookError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::HttpStatus { status_code, body } => Self::Api { status_code, body },
            other => Self::Transport(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
