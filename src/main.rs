use std::net::SocketAddr;

use sme_health_api::config::Config;
use sme_health_api::router::build_router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the router and serves it.
/// The server is run with connect info so the rate limiter can key on the
/// peer address when no forwarding header is present.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sme_health_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let app = build_router(&config)?;

    tracing::info!("🏦 Financial Health Survey API is starting...");
    tracing::info!("API endpoints available:");
    tracing::info!("   - GET  /              - API info");
    tracing::info!("   - GET  /api/health    - Health check");
    tracing::info!("   - POST /api/predict   - Submit survey for prediction");

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
