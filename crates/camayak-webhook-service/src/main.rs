//! # Camayak Webhook Service
//!
//! Binary entry point for the Content API webhook receiver.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes structured logging
//! - Builds the signed Content API client and event router
//! - Serves the webhook endpoints until SIGINT/SIGTERM
//!
//! Exit codes: 1 bind failure, 2 server failure, 3 configuration error,
//! 4 Content API client setup failure.

use camayak_content_sdk::EventRouter;
use camayak_webhook_service::{start_server, LoggingConfig, ServiceConfig, ServiceError};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, exit_code = e.exit_code(), "Camayak webhook service stopped");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), ServiceError> {
    let config = match ServiceConfig::load() {
        Ok(config) => {
            init_tracing(&config.logging);
            config
        }
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            return Err(e.into());
        }
    };

    info!("Starting Camayak webhook service");
    config.validate()?;

    let client = config.content_api.build_client()?;
    if !client.credentials().has_shared_secret() {
        warn!("No shared secret configured; Content API requests will be unsigned");
    }

    // The bundled binary acknowledges every event; real destinations link the
    // library and supply their own ContentHandler.
    warn!("Using DefaultContentHandler; content events are acknowledged without publishing");
    let event_router = EventRouter::with_default_handler(client);

    info!(
        host = %config.server.host,
        port = config.server.port,
        endpoint = %config.content_api.endpoint,
        "Starting HTTP server"
    );

    start_server(config, event_router).await
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "camayak_webhook_service={level},camayak_content_sdk={level},tower_http=debug",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
