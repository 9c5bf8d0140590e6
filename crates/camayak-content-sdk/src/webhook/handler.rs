//! Application-provided publishing logic.
//!
//! Implement [`ContentHandler`] to push Camayak assignments into an external
//! system. Each method receives the [`WebhookResponder`] for the inbound
//! request and must eventually call `succeed` or `fail` on it, possibly after
//! its own asynchronous work. Methods left unimplemented fall back to the
//! defaults described on each method.
//!
//! # Examples
//!
//! ```rust,no_run
//! use camayak_content_sdk::webhook::{Content, ContentHandler, PublishReceipt, WebhookResponder};
//! use async_trait::async_trait;
//!
//! struct SlackAnnouncer;
//!
//! #[async_trait]
//! impl ContentHandler for SlackAnnouncer {
//!     async fn publish(&self, responder: WebhookResponder, content: Content) {
//!         let heading = content.get("heading").and_then(|v| v.as_str()).unwrap_or("untitled");
//!         println!("New story: {}", heading);
//!         responder.succeed(Some(PublishReceipt::new("slack-message-1")));
//!     }
//!
//!     async fn retract(&self, responder: WebhookResponder, _content: Content) {
//!         responder.fail("retracting Slack messages is not supported");
//!     }
//! }
//! ```

use async_trait::async_trait;

use super::events::Content;
use super::responder::WebhookResponder;
use crate::error::WebhookError;

/// Publish, update, retract and error callbacks for Content API webhooks.
///
/// # Concurrency
///
/// Each invocation runs on its own task. Handlers must be `Send + Sync`
/// because webhooks for different assignments are handled concurrently.
#[async_trait]
pub trait ContentHandler: Send + Sync {
    /// First publication of an assignment (no `published_id` yet).
    ///
    /// Default: acknowledge with an empty success. Only useful as a wiring
    /// placeholder; Camayak will never learn an external identity.
    async fn publish(&self, responder: WebhookResponder, _content: Content) {
        responder.succeed(None);
    }

    /// Republication of an assignment that already has a `published_id`.
    ///
    /// Default: acknowledge with an empty success.
    async fn update(&self, responder: WebhookResponder, _content: Content) {
        responder.succeed(None);
    }

    /// Retraction of a previously published assignment.
    ///
    /// Default: acknowledge with an empty success.
    async fn retract(&self, responder: WebhookResponder, _content: Content) {
        responder.succeed(None);
    }

    /// Any failure before a publish/update/retract handler could be chosen.
    ///
    /// Default: report the error with HTTP 500 so Camayak retries.
    async fn error(&self, error: WebhookError, responder: WebhookResponder) {
        responder.fail(error);
    }
}

/// Handler that uses every default: succeed on content events, fail on errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContentHandler;

impl ContentHandler for DefaultContentHandler {}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
