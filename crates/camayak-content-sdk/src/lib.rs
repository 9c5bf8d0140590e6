//! # Camayak Content SDK
//!
//! Software Development Kit for integrating an external publishing target with
//! the Camayak Content API.
//!
//! This SDK provides:
//! - Time-based HMAC request signing for the Content API
//! - A Content API client for listing and fetching assignments
//! - Webhook event classification and dispatch to application handlers
//! - A single-shot responder that acknowledges success or failure back to Camayak
//!
//! # Examples
//!
//! ## Signing a request
//!
//! ```rust
//! use camayak_content_sdk::auth::{Credentials, SignedRequestParams};
//!
//! let credentials = Credentials::new("my-api-key").with_shared_secret("my-secret");
//! let params = SignedRequestParams::at(&credentials, 1_700_000_000)?;
//!
//! assert_eq!(params.api_key(), "my-api-key");
//! assert!(params.api_sig().is_some());
//! # Ok::<(), camayak_content_sdk::SigningError>(())
//! ```
//!
//! ## Handling webhooks
//!
//! ```rust,no_run
//! use camayak_content_sdk::auth::Credentials;
//! use camayak_content_sdk::client::ContentClient;
//! use camayak_content_sdk::webhook::{
//!     Content, ContentHandler, EventRouter, PublishReceipt, WebhookResponder,
//! };
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct BlogPublisher;
//!
//! #[async_trait]
//! impl ContentHandler for BlogPublisher {
//!     async fn publish(&self, responder: WebhookResponder, _content: Content) {
//!         // Push the assignment to the blog, then report its identity back.
//!         let receipt = PublishReceipt::new("post-42")
//!             .with_published_url("https://blog.example.com/posts/42");
//!         responder.succeed(Some(receipt));
//!     }
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ContentClient::builder(Credentials::new("my-api-key")).build()?;
//! let router = EventRouter::new(client, Arc::new(BlogPublisher));
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod auth;
pub mod client;
pub mod error;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use error::{ApiError, SigningError, WebhookError};

pub use auth::{Credentials, SignedRequestParams};
pub use client::{ClientConfig, ContentClient, ListOptions};
pub use webhook::{
    Content, ContentHandler, DefaultContentHandler, EventKind, EventRouter, InboundEvent,
    PendingReply, PublishReceipt, WebhookFailure, WebhookReply, WebhookResponder, WebhookResult,
};
