//! sns-relay server entry point.
//!
//! Loads the subscription document and starts the Axum HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sns_relay::api;
use sns_relay::app_state::AppState;
use sns_relay::config::RelayConfig;
use sns_relay::domain::SubscriptionRegistry;
use sns_relay::service::{FanoutMode, PublishRelay, QueueClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration; nothing is served if this fails
    let config = RelayConfig::load().context("failed to load relay configuration")?;
    for subscription in &config.subscriptions {
        tracing::info!(
            topic = %subscription.topic,
            target = subscription.target_name(),
            raw = subscription.raw_delivery,
            "subscription registered"
        );
    }

    // Build domain and service layers
    let registry = Arc::new(SubscriptionRegistry::new(config.subscriptions));
    let client =
        QueueClient::new(config.delivery_timeout).context("failed to build HTTP client")?;
    let fanout = if config.fanout_parallel {
        FanoutMode::Parallel
    } else {
        FanoutMode::Sequential
    };
    let relay = Arc::new(
        PublishRelay::new(registry, client, fanout).with_fanout_budget(config.request_timeout),
    );

    let app = api::build_app(AppState {
        relay,
        request_timeout: config.request_timeout,
    });

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, ?fanout, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
