mod api;
mod config;
mod db;
mod errors;
mod metrics;
mod models;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::handlers::AppStateInner;
use api::routes::create_router;
use config::Config;
use db::{InstrumentedRepository, Repository};

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,product_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Product API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize metrics
    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // Wire the debug flag into the error classifier
    errors::set_debug_responses(config.debug);
    if config.debug {
        warn!("Debug responses enabled; 500 responses will carry diagnostic detail");
    }

    // Initialize repository backend
    info!("Connecting to database...");
    let repository = db::init_repository(&config.database)
        .await
        .context("Failed to initialize repository")?;

    repository
        .test_connection()
        .await
        .context("Failed to test database connection")?;
    info!("Database connection established");

    let repository = Arc::new(InstrumentedRepository::new(repository)) as Repository;

    // Prime the products gauge
    let total = repository
        .count()
        .await
        .context("Failed to count products")?;
    info!("Product catalog contains {} products", total);

    // Create application state
    let state = Arc::new(AppStateInner {
        repository,
        write_token: config.write_token.clone(),
    });

    if state.write_token.is_some() {
        info!("Write token configured; mutating endpoints require authentication");
    }

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
