//! Relay Publisher - HTTP front end for the RabbitMQ topic publisher.
//!
//! Startup declares the exchange, queues and bindings before the HTTP
//! listener is bound. A declaration failure aborts the process so no publish
//! request is ever accepted against an undeclared topology.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::{web, AmqpSettings, AmqpTransport, AppState, Config, Publisher, TopologyDeclarator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("publisher_starting");

    // Load configuration from environment
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        amqp_url_set = !config.amqp_url.is_empty(),
        exchange = %config.topology.exchange_name,
        queue = %config.topology.queue_name,
        json_queue = %config.topology.queue_json_name,
        publisher_confirms = config.publisher_confirms,
        port = config.port,
        "config_loaded"
    );

    let transport = AmqpTransport::new(
        config.amqp_url.clone(),
        AmqpSettings {
            publisher_confirms: config.publisher_confirms,
            mandatory: config.publish_mandatory,
        },
    );

    // Topology must be in place before any traffic is accepted
    let topology = TopologyDeclarator::new(Arc::new(transport.clone()))
        .declare(&config.topology)
        .await
        .context("Failed to declare broker topology")?;

    let publisher = Publisher::new(Arc::new(transport.clone()), &topology);
    info!(
        exchange = %publisher.exchange(),
        routing_key = %publisher.routing_key(),
        "publisher_ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = web::router(AppState::new(publisher));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    transport.close().await;

    info!("publisher_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
