//! arena-backoffice server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and
//! the background feedback bridge.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use arena_backoffice::app_state::AppState;
use arena_backoffice::config::BackofficeConfig;
use arena_backoffice::outbound::FeedbackMailer;
use arena_backoffice::service::FeedbackBridge;
use arena_backoffice::store::{PostgresStore, Store};
use arena_backoffice::{api, ws};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BackofficeConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting arena-backoffice");

    // Pick the store backend
    let store = match config.store_backend.as_str() {
        "memory" => {
            tracing::warn!("using the in-memory store; nothing will be persisted");
            Store::memory()
        }
        _ => Store::Postgres(PostgresStore::connect(&config).await?),
    };

    // Spawn the feedback bridge; it outlives every connection
    let bridge = FeedbackBridge::spawn(&store, FeedbackMailer::from_config(&config));

    // Build application state
    let app_state = AppState::new(store.clone(), &config, bridge.delivery_status());

    // Build router
    let app = Router::new()
        .merge(api::build_router(&app_state))
        .merge(ws::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
