//! Single-shot acknowledgment of one inbound webhook.
//!
//! Camayak keeps the webhook HTTP request open until the integration reports
//! the outcome of publishing. A [`WebhookResponder`] is the handler-side half
//! of that exchange and a [`PendingReply`] is the transport-side half:
//!
//! - [`WebhookResponder::succeed`] becomes HTTP 200; Camayak stores the
//!   returned `published_id`/`published_url` for later update and retract events
//! - [`WebhookResponder::fail`] becomes HTTP 500; Camayak retries the webhook
//!   with increasing delays
//!
//! Both terminal operations consume the responder, so a second resolution is a
//! compile error. A responder dropped without resolving is reported to the
//! transport as a failure.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::WebhookError;

/// Message reported when a handler finishes without calling `succeed` or `fail`.
pub const UNRESOLVED_MESSAGE: &str = "Webhook handler completed without responding";

/// Identity of an assignment in the external system, reported on success.
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::webhook::PublishReceipt;
///
/// let receipt = PublishReceipt::new("abc123")
///     .with_published_url("http://example.com/posts/abc123");
///
/// assert_eq!(
///     serde_json::to_string(&receipt).unwrap(),
///     r#"{"published_id":"abc123","published_url":"http://example.com/posts/abc123"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,
}

impl PublishReceipt {
    /// Create a receipt carrying the external identifier.
    pub fn new(published_id: impl Into<String>) -> Self {
        Self {
            published_id: Some(published_id.into()),
            published_url: None,
        }
    }

    /// Attach the public URL of the published item.
    pub fn with_published_url(mut self, published_url: impl Into<String>) -> Self {
        self.published_url = Some(published_url.into());
        self
    }
}

/// Serialized error body of a failed webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookFailure {
    /// Human-readable error message
    pub error: String,

    /// Error category, for failures raised by the SDK itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Content API status code, when the failure came from a non-2xx fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl WebhookFailure {
    /// Create a failure with a plain message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
            status_code: None,
        }
    }

    /// Create a failure from any error, using its `Display` output.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(error.to_string())
    }
}

impl From<&WebhookError> for WebhookFailure {
    fn from(error: &WebhookError) -> Self {
        Self {
            error: error.to_string(),
            kind: Some(error.kind().to_string()),
            status_code: error.status_code(),
        }
    }
}

impl From<WebhookError> for WebhookFailure {
    fn from(error: WebhookError) -> Self {
        Self::from(&error)
    }
}

impl From<String> for WebhookFailure {
    fn from(error: String) -> Self {
        Self::new(error)
    }
}

impl From<&str> for WebhookFailure {
    fn from(error: &str) -> Self {
        Self::new(error)
    }
}

/// Final outcome of one webhook, as reported by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    /// 200 OK, with an optional receipt body
    Success(Option<PublishReceipt>),

    /// 500 Internal Server Error; Camayak will retry
    Failure(WebhookFailure),
}

impl WebhookResult {
    /// Get the HTTP status code for this result.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure(_) => 500,
        }
    }

    /// Check if the result indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Handler-side half of one inbound webhook response.
///
/// Created by the event router for each request and passed by value to
/// exactly one handler invocation. Never shared across requests.
pub struct WebhookResponder {
    event_id: Option<String>,
    reply: Option<oneshot::Sender<WebhookResult>>,
}

impl WebhookResponder {
    /// Create a connected responder/pending-reply pair for one request.
    ///
    /// # Examples
    ///
    /// ```
    /// use camayak_content_sdk::webhook::{WebhookResponder, WebhookResult};
    ///
    /// # tokio_test::block_on(async {
    /// let (responder, pending) = WebhookResponder::channel(Some("evt-1".to_string()));
    /// responder.fail("downstream CMS unavailable");
    ///
    /// let result = pending.wait().await;
    /// assert_eq!(result.status_code(), 500);
    /// # });
    /// ```
    pub fn channel(event_id: Option<String>) -> (Self, PendingReply) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                event_id,
                reply: Some(sender),
            },
            PendingReply { receiver },
        )
    }

    /// Camayak event identifier of the request this responder answers.
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// Acknowledge successful publication with HTTP 200.
    ///
    /// Pass a receipt so Camayak can route later update and retract events
    /// for this assignment; `None` sends an empty body.
    pub fn succeed(mut self, receipt: Option<PublishReceipt>) {
        self.resolve(WebhookResult::Success(receipt));
    }

    /// Report failure with HTTP 500, prompting Camayak to retry.
    pub fn fail(mut self, error: impl Into<WebhookFailure>) {
        self.resolve(WebhookResult::Failure(error.into()));
    }

    fn resolve(&mut self, result: WebhookResult) {
        let Some(sender) = self.reply.take() else {
            return;
        };

        let status_code = result.status_code();
        if sender.send(result).is_err() {
            // The inbound connection is gone (client timeout or disconnect).
            debug!(
                event_id = ?self.event_id,
                status_code,
                "Webhook connection closed before response; discarding result"
            );
        }
    }
}

impl Drop for WebhookResponder {
    fn drop(&mut self) {
        if self.reply.is_some() {
            warn!(
                event_id = ?self.event_id,
                "Webhook responder dropped without succeed or fail"
            );
        }
    }
}

impl std::fmt::Debug for WebhookResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookResponder")
            .field("event_id", &self.event_id)
            .field("resolved", &self.reply.is_none())
            .finish()
    }
}

/// Transport-side half of one inbound webhook response.
#[derive(Debug)]
pub struct PendingReply {
    receiver: oneshot::Receiver<WebhookResult>,
}

impl PendingReply {
    /// Wait for the handler to resolve the paired responder.
    ///
    /// If the responder is dropped unresolved, yields a failure so the
    /// platform retries instead of hanging.
    pub async fn wait(self) -> WebhookResult {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => WebhookResult::Failure(WebhookFailure::new(UNRESOLVED_MESSAGE)),
        }
    }
}

#[cfg(test)]
#[path = "responder_tests.rs"]
mod tests;
