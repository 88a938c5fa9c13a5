//! storefront-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints backed
//! by a PostgreSQL pool.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storefront_gateway::api;
use storefront_gateway::app_state::AppState;
use storefront_gateway::config::GatewayConfig;
use storefront_gateway::domain::EventBus;
use storefront_gateway::service::{CartService, OrderService, SessionGuard};
use storefront_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting storefront-gateway");

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("migrations applied");
    }

    // Build domain and service layers
    let event_bus = EventBus::new(config.event_bus_capacity);
    let cart_service = Arc::new(CartService::new(pool.clone()));
    let order_service = Arc::new(OrderService::new(pool.clone(), event_bus.clone()));
    let session_guard = Arc::new(SessionGuard::new(
        pool,
        event_bus.clone(),
        Duration::from_secs(config.session_idle_timeout_secs),
    ));

    // Build application state
    let app_state = AppState {
        cart_service,
        order_service,
        session_guard,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
