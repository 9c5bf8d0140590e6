//! Tests for graceful shutdown functionality

use super::*;
use async_trait::async_trait;
use camayak_content_sdk::webhook::{Content, ContentHandler, WebhookResponder};
use camayak_content_sdk::{ContentClient, Credentials, WebhookError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;

// ============================================================================
// Test Helpers
// ============================================================================

/// Never resolves its responder.
struct StalledHandler;

#[async_trait]
impl ContentHandler for StalledHandler {
    async fn publish(&self, _responder: WebhookResponder, _content: Content) {
        std::future::pending::<()>().await;
    }

    async fn error(&self, _error: WebhookError, _responder: WebhookResponder) {
        std::future::pending::<()>().await;
    }
}

/// Resolves its error responder after a short delay.
struct SlowHandler;

#[async_trait]
impl ContentHandler for SlowHandler {
    async fn error(&self, error: WebhookError, responder: WebhookResponder) {
        tokio::time::sleep(Duration::from_millis(300)).await;
        responder.fail(error);
    }
}

fn test_client() -> ContentClient {
    ContentClient::builder(Credentials::new("test-api-key"))
        .build()
        .unwrap()
}

fn test_state(server: ServerConfig, handler: Arc<dyn ContentHandler>) -> AppState {
    AppState::new(server, EventRouter::new(test_client(), handler))
}

struct RunningServer {
    address: std::net::SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<Result<(), ServiceError>>,
}

async fn spawn_server(state: AppState) -> RunningServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    RunningServer {
        address,
        shutdown,
        handle,
    }
}

/// Minimal HTTP/1.1 request over a raw socket, returning the full response text.
async fn raw_http(address: std::net::SocketAddr, request: String) -> String {
    let mut stream = tokio::net::TcpStream::connect(address).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn get_request(path: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    )
}

fn post_webhook_request(body: &str) -> String {
    format!(
        "POST /webhook/ HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

async fn wait_for_in_flight(state: &AppState, expected: usize) {
    for _ in 0..100 {
        if state.in_flight_webhooks() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "expected {} in-flight webhooks, found {}",
        expected,
        state.in_flight_webhooks()
    );
}

// ============================================================================
// Shutdown Tests
// ============================================================================

/// Verify that custom shutdown timeout can be set
#[test]
fn test_custom_shutdown_timeout() {
    let config = ServerConfig {
        shutdown_timeout_seconds: 60,
        ..Default::default()
    };

    assert_eq!(config.shutdown_timeout_seconds, 60);
}

/// Verify the server answers requests and stops once the shutdown future resolves
#[tokio::test]
async fn test_serve_stops_on_shutdown() {
    // Arrange
    let server = spawn_server(AppState::new(
        ServerConfig::default(),
        EventRouter::with_default_handler(test_client()),
    ))
    .await;

    // Act
    let body = raw_http(server.address, get_request("/")).await;
    server.shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not shut down")
        .unwrap();

    // Assert
    assert!(body.ends_with("Ok."));
    assert!(result.is_ok());
}

/// Verify a handler that never resolves cannot hold shutdown past the timeout
#[tokio::test]
async fn test_shutdown_abandons_stalled_webhook_after_timeout() {
    // Arrange
    let server_config = ServerConfig {
        shutdown_timeout_seconds: 1,
        ..Default::default()
    };
    let state = test_state(server_config, Arc::new(StalledHandler));
    let server = spawn_server(state.clone()).await;
    let address = server.address;
    let stalled = tokio::spawn(async move {
        raw_http(address, post_webhook_request(r#"{"event":"bogus"}"#)).await
    });
    wait_for_in_flight(&state, 1).await;

    // Act
    server.shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle).await;

    // Assert
    let result = result.expect("server did not finish within the shutdown timeout");
    assert!(result.unwrap().is_ok());
    assert_eq!(state.in_flight_webhooks(), 1);
    stalled.abort();
}

/// Verify in-flight webhooks that finish within the timeout are still answered
#[tokio::test]
async fn test_shutdown_waits_for_webhook_within_timeout() {
    // Arrange
    let server_config = ServerConfig {
        shutdown_timeout_seconds: 5,
        ..Default::default()
    };
    let state = test_state(server_config, Arc::new(SlowHandler));
    let server = spawn_server(state.clone()).await;
    let address = server.address;
    let in_flight = tokio::spawn(async move {
        raw_http(address, post_webhook_request(r#"{"event":"bogus"}"#)).await
    });
    wait_for_in_flight(&state, 1).await;

    // Act
    server.shutdown.send(()).unwrap();
    let response = in_flight.await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not shut down")
        .unwrap();

    // Assert
    assert!(response.starts_with("HTTP/1.1 500"));
    assert!(response.contains("Unknown event type"));
    assert!(result.is_ok());
    assert_eq!(state.in_flight_webhooks(), 0);
}

/// Verify that binding an address in use reports BindFailed
#[tokio::test]
async fn test_start_server_reports_bind_failure() {
    // Arrange
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();
    let mut config = ServiceConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = port;

    // Act
    let result = start_server(config, EventRouter::with_default_handler(test_client())).await;

    // Assert
    match result {
        Err(error @ ServiceError::BindFailed { .. }) => assert_eq!(error.exit_code(), 1),
        other => panic!("Expected BindFailed, got {:?}", other),
    }
}
