use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gofer::config::AppConfig;
use gofer::db;
use gofer::handlers;
use gofer::services::notifications::broadcast::BroadcastRelay;
use gofer::services::pricing::SurgePolicy;
use gofer::services::routing::distance_matrix::DistanceMatrixProvider;
use gofer::services::routing::{RouteEstimator, RoutingProvider};
use gofer::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let timeout = Duration::from_millis(config.routing_timeout_ms);
    let provider: Option<Box<dyn RoutingProvider>> = if config.has_routing_provider() {
        tracing::info!("using distance matrix routing (url: {})", config.routing_url);
        Some(Box::new(DistanceMatrixProvider::new(
            config.routing_url.clone(),
            config.routing_api_key.clone(),
            timeout,
        )?))
    } else {
        tracing::info!("ROUTING_API_KEY not set, distances use the haversine estimate");
        None
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        routes: RouteEstimator::new(provider, timeout),
        surge: SurgePolicy::with_radius(config.surge_radius_km),
        notifier: Box::new(BroadcastRelay::new(256)),
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
