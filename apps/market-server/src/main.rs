//! # Bazaar Market Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Startup                                          │
//! │                                                                         │
//! │  config ──► SQLite + migrations ──► admin bootstrap ──► HTTP (8080)     │
//! │                                                          │              │
//! │                              Ctrl+C / SIGTERM ──► graceful shutdown     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_db::{Database, DbConfig};
use market_server::services::accounts::bootstrap_admin;
use market_server::{router, AppState, MarketConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,market_server=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Bazaar Market server...");

    // Load configuration
    let config = MarketConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    if config.uses_dev_secret() {
        warn!("SESSION_SECRET not set; using the development secret");
    }

    // Open database (migrations run on connect)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    bootstrap_admin(&db, &config).await?;

    let bind_addr = config.bind_address();
    let state = Arc::new(AppState::new(db, config));
    let app = router(state.clone());

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
