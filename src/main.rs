//! Case Desk service
//!
//! Serves the agent configuration and the case-management tools to the
//! external agent runtime.

use case_desk::api::{create_router, AppState};
use case_desk::cases::CaseDesk;
use case_desk::config::ServerConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "case_desk=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env();

    let rng = match config.seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded random source");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let desk = CaseDesk::new(rng)
        .with_policy(config.failure_policy)
        .with_latency(config.latency);

    tracing::info!(
        model = %config.model,
        policy = ?desk.policy(),
        latency = config.latency.is_enabled(),
        "Case desk initialized"
    );

    // Create application state
    let state = AppState::new(desk, &config.model);
    let shutdown = state.shutdown.clone();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Case desk listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down; cancelling in-flight tool calls");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
