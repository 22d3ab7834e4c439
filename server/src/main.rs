//! Goplum Relay - Main Entry Point
//!
//! Registers the `goplum` webhook route with the IRC bot host and relays
//! monitoring events to the configured channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use goplum_relay::rpc::RpcClient;
use goplum_relay::webhooks::WebhookHandler;
use goplum_relay::{config, observability, relay};

/// How long to wait for in-flight notifications on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Pin the rustls crypto provider before any TLS operations
    let _ =
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider());

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing; the guard flushes exporters when main returns
    let _otel_guard = observability::init(&config.observability)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Goplum relay"
    );

    info!(host = %config.rpc.host, port = config.rpc.port, "Creating RPC client");
    let client = RpcClient::connect(&config.rpc)
        .await
        .context("Unable to create RPC client")?;

    let handler = WebhookHandler::new(&config.webhook, Arc::new(client.clone()));

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    info!(route = %config.webhook.route, "Starting webhook relay");
    let result = tokio::select! {
        result = relay::run(
            &client,
            &handler,
            &config.webhook.route,
            config.rpc.reconnect_attempts,
        ) => result.context("Error handling webhooks"),
        () = shutdown_signal => Ok(()),
    };

    if !handler.shutdown(SHUTDOWN_GRACE).await {
        warn!(
            in_flight = handler.in_flight(),
            "Gave up waiting for in-flight notifications"
        );
    }

    info!("Relay shutdown complete");
    result
}
