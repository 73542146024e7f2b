//! Gateway entry point.
//!
//! Startup order: logging, configuration (environment + TLS discovery),
//! then the HTTP front end. An unknown payload format version is fatal
//! before any request is served.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lambda_dev_gateway::config::GatewayConfig;
use lambda_dev_gateway::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lambda_dev_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    tracing::info!(lambda_host = %config.lambda_host, "Lambda address");
    tracing::info!(
        port = config.port,
        scheme = config.scheme(),
        url = %config.base_url(),
        "Listening"
    );
    tracing::info!(version = %config.format, "Payload format version");

    server::serve(config).await
}
