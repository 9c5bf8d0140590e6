//! Event classification and handler dispatch.
//!
//! The [`EventRouter`] drives one inbound webhook through these states:
//!
//! ```text
//! Received -> Classified -> Validating                         -> pong
//!                        -> Fetching -> Dispatched (handler)   -> responder
//!                        -> Dispatched (error handler)         -> responder
//! ```
//!
//! Whether a `publish` event becomes a publish or an update is decided by the
//! fetched content, not by the event name: Camayak reuses `publish` for
//! republication, and the `published_id` a previous response reported is the
//! only record of the external identity.
//!
//! Every failure is routed to [`ContentHandler::error`]; nothing escapes to
//! the HTTP layer.

use std::sync::Arc;

use tracing::{debug, field, info, instrument, warn, Span};

use super::events::{Content, EventKind, InboundEvent};
use super::handler::{ContentHandler, DefaultContentHandler};
use super::responder::{PendingReply, WebhookResponder};
use crate::client::ContentClient;
use crate::error::{ApiError, WebhookError};

/// Body of the synchronous reply to a `validate` event.
pub const PONG: &str = "pong";

/// What the transport should send back for an inbound webhook.
#[derive(Debug)]
pub enum WebhookReply {
    /// Answer immediately with HTTP 200, `text/plain`, body [`PONG`].
    Pong,

    /// Wait for the dispatched handler to resolve its responder.
    Pending(PendingReply),
}

/// Handler selected for a successfully fetched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// First publication
    Publish,
    /// Republication of already-published content
    Update,
    /// Take-down of published content
    Retract,
}

/// Decide which handler applies to `event` given the fetched `content`.
///
/// # Errors
///
/// Returns `WebhookError::UnexpectedState` for a retract of content that was
/// never published, and for event kinds that never reach classification.
///
/// # Examples
///
/// ```
/// use camayak_content_sdk::webhook::{classify, Content, EventKind, Route};
///
/// let fresh = Content::from_json("{}").unwrap();
/// let published = Content::from_json(r#"{"published_id":"x"}"#).unwrap();
///
/// assert_eq!(classify(EventKind::Publish, &fresh).unwrap(), Route::Publish);
/// assert_eq!(classify(EventKind::Publish, &published).unwrap(), Route::Update);
/// assert_eq!(classify(EventKind::Retract, &published).unwrap(), Route::Retract);
/// assert!(classify(EventKind::Retract, &fresh).is_err());
/// ```
pub fn classify(event: EventKind, content: &Content) -> Result<Route, WebhookError> {
    match (event, content.is_published()) {
        (EventKind::Publish, true) => Ok(Route::Update),
        (EventKind::Publish, false) => Ok(Route::Publish),
        (EventKind::Retract, true) => Ok(Route::Retract),
        (event, _) => Err(WebhookError::UnexpectedState { event }),
    }
}

/// Routes Content API webhooks to a [`ContentHandler`].
///
/// Cheap to clone; clones share the client and the handler. Holds no
/// per-request state.
#[derive(Clone)]
pub struct EventRouter {
    client: ContentClient,
    handler: Arc<dyn ContentHandler>,
}

impl EventRouter {
    /// Create a router that fetches content with `client` and dispatches to `handler`.
    pub fn new(client: ContentClient, handler: Arc<dyn ContentHandler>) -> Self {
        Self { client, handler }
    }

    /// Create a router whose handlers are all [`DefaultContentHandler`] defaults.
    pub fn with_default_handler(client: ContentClient) -> Self {
        Self::new(client, Arc::new(DefaultContentHandler))
    }

    /// The Content API client used for resource fetches.
    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    /// Process one inbound webhook body.
    ///
    /// Returns as soon as a handler has been dispatched; the handler runs on
    /// its own task and resolves the reply through its responder.
    #[instrument(
        skip(self, payload),
        fields(event = field::Empty, event_id = field::Empty)
    )]
    pub async fn receive_webhook(&self, payload: &[u8]) -> WebhookReply {
        let inbound = InboundEvent::parse(payload);

        let span = Span::current();
        span.record("event", inbound.event.as_str());
        if let Some(event_id) = &inbound.event_id {
            span.record("event_id", event_id.as_str());
        }

        if inbound.event == EventKind::Validate {
            info!("Answering webhook validation request");
            return WebhookReply::Pong;
        }

        let (responder, pending) = WebhookResponder::channel(inbound.event_id.clone());

        match inbound.event {
            EventKind::Publish | EventKind::Retract => {
                match self.fetch_content(inbound.resource_uri.as_deref()).await {
                    Ok(content) => match classify(inbound.event, &content) {
                        Ok(route) => self.dispatch(route, responder, content),
                        Err(error) => self.dispatch_error(error, responder),
                    },
                    Err(error) => self.dispatch_error(error, responder),
                }
            }
            _ => {
                let error = WebhookError::UnknownEvent {
                    event: inbound.event_name,
                };
                self.dispatch_error(error, responder);
            }
        }

        WebhookReply::Pending(pending)
    }

    async fn fetch_content(&self, resource_uri: Option<&str>) -> Result<Content, WebhookError> {
        let resource_uri = resource_uri.ok_or_else(|| {
            WebhookError::Transport(ApiError::InvalidUrl {
                url: String::new(),
                message: "webhook payload has no resource_uri".to_string(),
            })
        })?;

        debug!(resource_uri = %resource_uri, "Fetching webhook resource");
        let body = self.client.fetch_resource(resource_uri).await?;

        Content::from_json(&body).map_err(|e| WebhookError::Parse {
            message: e.to_string(),
        })
    }

    fn dispatch(&self, route: Route, responder: WebhookResponder, content: Content) {
        info!(
            route = ?route,
            published_id = ?content.published_id(),
            "Dispatching webhook to content handler"
        );

        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            match route {
                Route::Publish => handler.publish(responder, content).await,
                Route::Update => handler.update(responder, content).await,
                Route::Retract => handler.retract(responder, content).await,
            }
        });
    }

    fn dispatch_error(&self, error: WebhookError, responder: WebhookResponder) {
        warn!(
            error = %error,
            kind = error.kind(),
            status_code = ?error.status_code(),
            "Dispatching webhook to error handler"
        );

        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            handler.error(error, responder).await;
        });
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("client", &self.client)
            .field("handler", &"<ContentHandler>")
            .finish()
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
