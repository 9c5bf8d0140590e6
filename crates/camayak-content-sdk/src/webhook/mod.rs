//! Camayak Content API webhook processing.
//!
//! Camayak notifies a publishing destination about assignment lifecycle events
//! by POSTing `{event, event_id, resource_uri}` to its webhook URL, and keeps
//! the request open until the destination reports the outcome.
//!
//! # Core Components
//!
//! - [`EventRouter`] - classifies events, fetches content, dispatches to handlers
//! - [`ContentHandler`] - trait for application-provided publishing logic
//! - [`WebhookResponder`] - single-shot success/failure acknowledgment
//! - [`InboundEvent`]/[`Content`] - parsed webhook payload and fetched assignment
//!
//! # Event Routing
//!
//! | Event | Fetched content | Handler |
//! |-------|-----------------|---------|
//! | `validate` | (none fetched) | none; reply `pong` |
//! | `publish` | no `published_id` | [`ContentHandler::publish`] |
//! | `publish` | has `published_id` | [`ContentHandler::update`] |
//! | `retract` | has `published_id` | [`ContentHandler::retract`] |
//! | `retract` | no `published_id` | [`ContentHandler::error`] |
//! | anything else | (none fetched) | [`ContentHandler::error`] |
//!
//! # HTTP Server Integration (Axum Example)
//!
//! ```rust,ignore
//! use camayak_content_sdk::webhook::{EventRouter, WebhookReply, WebhookResult};
//! use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
//! use bytes::Bytes;
//!
//! async fn handle_webhook(State(router): State<EventRouter>, body: Bytes) -> axum::response::Response {
//!     match router.receive_webhook(&body).await {
//!         WebhookReply::Pong => "pong".into_response(),
//!         WebhookReply::Pending(pending) => match pending.wait().await {
//!             WebhookResult::Success(receipt) => Json(receipt).into_response(),
//!             WebhookResult::Failure(failure) => {
//!                 (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
//!             }
//!         },
//!     }
//! }
//! ```

pub mod events;
pub mod handler;
pub mod responder;
pub mod router;

// Re-export main types
pub use events::{Content, EventKind, InboundEvent};
pub use handler::{ContentHandler, DefaultContentHandler};
pub use responder::{PendingReply, PublishReceipt, WebhookFailure, WebhookResponder, WebhookResult};
pub use router::{classify, EventRouter, Route, WebhookReply, PONG};
