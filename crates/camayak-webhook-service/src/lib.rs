//! # Camayak Webhook Service
//!
//! HTTP server exposing a [`ContentHandler`](camayak_content_sdk::ContentHandler)
//! to the Camayak Content API.
//!
//! Routes:
//! - `GET /`, `GET /webhook/` - liveness ping, body `Ok.`
//! - `POST /webhook/` - webhook events, answered once the handler resolves
//!
//! The request is held open until the dispatched handler calls `succeed`
//! (HTTP 200) or `fail` (HTTP 500); `validate` events are answered with
//! `pong` without any outbound call.

pub mod config;
pub mod errors;

pub use config::{ContentApiConfig, LoggingConfig, ServerConfig, ServiceConfig};
pub use errors::{ConfigError, ServiceError};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;


#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod shutdown_tests;

use std::future::{Future, IntoFuture};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use bytes::Bytes;
use camayak_content_sdk::webhook::{EventRouter, WebhookReply, WebhookResult, PONG};
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, field, info, instrument, warn, Span};

/// Body returned by the ping routes.
pub const PING_BODY: &str = "Ok.";

/// Header carrying the per-request correlation ID.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Router that fetches content and dispatches to the content handler
    pub event_router: EventRouter,

    /// HTTP server settings
    pub server: ServerConfig,

    in_flight: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(server: ServerConfig, event_router: EventRouter) -> Self {
        Self {
            event_router,
            server,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Webhooks currently waiting for their handler to resolve.
    pub fn in_flight_webhooks(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Counts one webhook as in flight until dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Correlation ID of the current request, set by the request logging middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Inbound `x-correlation-id` when present and non-empty, otherwise a new v4 UUID.
    fn from_request(request: &Request) -> Self {
        request
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(|| Self(uuid::Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.server.max_body_size;

    Router::new()
        .route("/", get(handle_ping))
        .route("/webhook/", get(handle_ping).post(handle_webhook))
        .route("/webhook", get(handle_ping).post(handle_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(DefaultBodyLimit::max(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Bind the configured address and serve until SIGINT or SIGTERM.
pub async fn start_server(
    config: ServiceConfig,
    event_router: EventRouter,
) -> Result<(), ServiceError> {
    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!(address = %address, "Starting HTTP server");

    serve(
        listener,
        AppState::new(config.server, event_router),
        shutdown_signal(),
    )
    .await
}

/// Serve `state` on an already bound listener until `shutdown` completes.
///
/// New connections are refused as soon as `shutdown` resolves. In-flight
/// webhooks then get `server.shutdown_timeout_seconds` to finish; any still
/// waiting on their handler after that are abandoned and the call returns.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown_timeout = Duration::from_secs(state.server.shutdown_timeout_seconds);
    let in_flight = Arc::clone(&state.in_flight);
    let (draining_tx, draining_rx) = oneshot::channel::<()>();

    let graceful = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = draining_tx.send(());
        })
        .into_future();

    let drain_deadline = async move {
        match draining_rx.await {
            Ok(()) => {
                info!(
                    timeout_seconds = shutdown_timeout.as_secs(),
                    in_flight_webhooks = in_flight.load(Ordering::SeqCst),
                    "Draining in-flight webhooks"
                );
                tokio::time::sleep(shutdown_timeout).await;
                in_flight.load(Ordering::SeqCst)
            }
            // Server stopped without a shutdown request; let it report why.
            Err(_) => std::future::pending::<usize>().await,
        }
    };

    tokio::select! {
        result = graceful => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
            info!("HTTP server shutdown complete");
        }
        abandoned = drain_deadline => {
            warn!(
                timeout_seconds = shutdown_timeout.as_secs(),
                abandoned_webhooks = abandoned,
                "Shutdown timeout elapsed; abandoning in-flight webhooks"
            );
        }
    }

    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM.
///
/// A signal handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness ping
pub async fn handle_ping() -> &'static str {
    PING_BODY
}

/// Handle a Content API webhook.
///
/// Waits for the content handler to resolve its responder before answering.
#[instrument(skip_all, fields(correlation_id = %correlation_id.as_str(), body_size = body.len()))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    body: Bytes,
) -> Response {
    let _in_flight = InFlightGuard::enter(&state.in_flight);

    match state.event_router.receive_webhook(&body).await {
        WebhookReply::Pong => PONG.into_response(),
        WebhookReply::Pending(pending) => webhook_result_response(pending.wait().await),
    }
}

/// Translate a resolved webhook into the HTTP response Camayak observes.
pub fn webhook_result_response(result: WebhookResult) -> Response {
    match result {
        WebhookResult::Success(Some(receipt)) => {
            info!(published_id = ?receipt.published_id, "Webhook succeeded");
            (StatusCode::OK, Json(receipt)).into_response()
        }
        WebhookResult::Success(None) => {
            info!("Webhook succeeded without receipt");
            StatusCode::OK.into_response()
        }
        WebhookResult::Failure(failure) => {
            warn!(
                error = %failure.error,
                kind = ?failure.kind,
                status_code = ?failure.status_code,
                "Webhook failed; Camayak will retry"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Tags each request with a [`CorrelationId`] and logs its outcome.
///
/// The ID is stored as a request extension for handlers and echoed in the
/// `x-correlation-id` response header. Completion is logged at error, warn
/// or info for 5xx, 4xx and everything else.
#[instrument(name = "http_request", skip_all, fields(
    method = %request.method(),
    path = %request.uri().path(),
    correlation_id = field::Empty,
))]
async fn request_logging_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_request(&request);
    Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    match status {
        500..=u16::MAX => error!(status, elapsed_ms, "Request failed"),
        400..=499 => warn!(status, elapsed_ms, "Request rejected"),
        _ => info!(status, elapsed_ms, "Request handled"),
    }

    response
}
