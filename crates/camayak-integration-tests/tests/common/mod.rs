//! Common test utilities for camayak-webhook-service integration tests
//!
//! This module provides:
//! - A running service bound to an ephemeral port, backed by a mock Content API
//! - A recording [`ContentHandler`] that publishes using fields of the content
//! - Helpers for building webhook payloads and mounting resources

use async_trait::async_trait;
use camayak_content_sdk::webhook::{Content, ContentHandler, PublishReceipt, WebhookResponder};
use camayak_content_sdk::{ClientConfig, ContentClient, Credentials, EventRouter, WebhookError};
use camayak_webhook_service::{serve, AppState, ServerConfig};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "integration-api-key";
pub const SHARED_SECRET: &str = "integration-secret";

// ============================================================================
// Recording Handler
// ============================================================================

/// Handler invocation as observed by [`RecordingHandler`]
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum HandlerCall {
    Publish(Content),
    Update(Content),
    Retract(Content),
    Error {
        kind: &'static str,
        status_code: Option<u16>,
    },
}

/// Publishes as the content's `slug` (or `42`), after an optional `delay_ms`.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<HandlerCall>>>,
}

impl RecordingHandler {
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<HandlerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HandlerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

async fn simulate_work(content: &Content) {
    if let Some(delay_ms) = content.get("delay_ms").and_then(|v| v.as_u64()) {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn slug(content: &Content) -> String {
    content
        .get("slug")
        .and_then(|v| v.as_str())
        .unwrap_or("42")
        .to_string()
}

#[async_trait]
impl ContentHandler for RecordingHandler {
    async fn publish(&self, responder: WebhookResponder, content: Content) {
        simulate_work(&content).await;
        let receipt = PublishReceipt::new(slug(&content));
        self.record(HandlerCall::Publish(content));
        responder.succeed(Some(receipt));
    }

    async fn update(&self, responder: WebhookResponder, content: Content) {
        simulate_work(&content).await;
        let published_id = content
            .published_id()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.record(HandlerCall::Update(content));
        responder.succeed(Some(
            PublishReceipt::new(published_id.clone())
                .with_published_url(format!("https://blog.example.com/{}", published_id)),
        ));
    }

    async fn retract(&self, responder: WebhookResponder, content: Content) {
        self.record(HandlerCall::Retract(content));
        responder.succeed(None);
    }

    async fn error(&self, error: WebhookError, responder: WebhookResponder) {
        self.record(HandlerCall::Error {
            kind: error.kind(),
            status_code: error.status_code(),
        });
        responder.fail(error);
    }
}

// ============================================================================
// Test Service
// ============================================================================

/// Webhook service running on an ephemeral port against a mock Content API.
///
/// The server is shut down gracefully when dropped.
pub struct TestService {
    pub address: SocketAddr,
    pub content_api: MockServer,
    pub handler: RecordingHandler,
    shutdown: Option<oneshot::Sender<()>>,
    _server: JoinHandle<()>,
}

impl TestService {
    /// Start with signing enabled.
    pub async fn start() -> Self {
        Self::start_with_credentials(Credentials::new(API_KEY).with_shared_secret(SHARED_SECRET))
            .await
    }

    pub async fn start_with_credentials(credentials: Credentials) -> Self {
        let content_api = MockServer::start().await;
        let handler = RecordingHandler::default();

        let client = ContentClient::builder(credentials)
            .config(
                ClientConfig::default()
                    .with_content_api_url(format!("{}/v1/content/", content_api.uri())),
            )
            .build()
            .unwrap();
        let event_router = EventRouter::new(client, Arc::new(handler.clone()));
        let state = AppState::new(ServerConfig::default(), event_router);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let _ = serve(listener, state, async move {
                let _ = shutdown_rx.await;
            })
            .await;
        });

        Self {
            address,
            content_api,
            handler,
            shutdown: Some(shutdown_tx),
            _server: server,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// URI of a resource on the mock Content API.
    pub fn resource_uri(&self, id: &str) -> String {
        format!("{}/v1/content/{}/", self.content_api.uri(), id)
    }

    /// Serve `body` with `status` for resource `id`.
    pub async fn mount_resource(&self, id: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/content/{}/", id)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.content_api)
            .await;
    }

    /// POST a webhook payload to `/webhook/`.
    pub async fn post_webhook(&self, payload: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url("/webhook/"))
            .json(&payload)
            .send()
            .await
            .unwrap()
    }

    /// POST a Camayak event for resource `id`.
    pub async fn post_event(&self, event: &str, id: &str) -> reqwest::Response {
        self.post_webhook(event_payload(event, &self.resource_uri(id)))
            .await
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Webhook body as sent by Camayak.
pub fn event_payload(event: &str, resource_uri: &str) -> serde_json::Value {
    serde_json::json!({
        "event": event,
        "event_id": format!("evt-{}", event),
        "resource_uri": resource_uri,
    })
}
