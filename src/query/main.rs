//! Query server for route lookups.
//!
//! Serves nearest-route and viewport queries over the cached upstream route feed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use juniper::config::Config;
use juniper::dataset::{DatasetCache, DatasetError, DatasetLoad, HttpRouteSource};
use juniper::engine::{nearest_routes, points_in_viewport};
use juniper::models::{Point, Route, RouteDataset};

mod params;
use params::{NearestQuery, ViewportQuery};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Nearest-route and viewport query server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Upstream route feed URL (overrides config)
    #[arg(long)]
    upstream_url: Option<String>,

    /// Cache time-to-live in seconds (overrides config)
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Fetch the dataset once before accepting requests
    #[arg(long)]
    warm: bool,
}

/// Application state shared across handlers
struct AppState {
    cache: DatasetCache<HttpRouteSource>,
}

type ApiError = (StatusCode, String);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(url) = args.upstream_url {
        config.upstream.url = url;
    }
    if let Some(ttl) = args.ttl_secs {
        config.cache.ttl_secs = ttl;
    }

    info!("Juniper Query Server");

    let source = HttpRouteSource::new(
        config.upstream.url()?,
        config.upstream.timeout(),
        &config.upstream.user_agent,
    )?;
    let cache = DatasetCache::new(source, config.cache.ttl());

    info!(
        "Upstream {} (timeout {:?}), cache TTL {:?}",
        cache.source().url(),
        config.upstream.timeout(),
        cache.ttl()
    );

    if args.warm {
        match cache.get_dataset().await {
            Ok(dataset) => info!("Warmed cache with {} routes", dataset.len()),
            Err(e) => warn!("Cache warm-up failed, will retry on first request: {}", e),
        }
    }

    let state = Arc::new(AppState { cache });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/routes/nearest", get(nearest_handler))
        .route("/v1/points/viewport", get(viewport_handler))
        .route("/v1/admin/refresh", post(refresh_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fetch the current dataset, mapping an empty cache to 503
async fn current_dataset(state: &AppState) -> Result<Arc<RouteDataset>, ApiError> {
    match state.cache.load().await {
        Ok(load) => {
            if let DatasetLoad::Stale { error, .. } = &load {
                warn!("Answering from stale route data: {}", error);
            }
            Ok(load.into_dataset())
        }
        Err(e @ DatasetError::Unavailable(_)) => {
            tracing::error!("Dataset unavailable: {}", e);
            Err((StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

/// Run CPU-bound query work off the async worker threads
async fn run_query<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("Query task failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let age = state.cache.age().await;

    Json(HealthResponse {
        status: if age.is_some() { "ok" } else { "cold" },
        cached: age.is_some(),
        age_secs: age.map(|a| a.as_secs()),
        ttl_secs: state.cache.ttl().as_secs(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    cached: bool,
    age_secs: Option<u64>,
    ttl_secs: u64,
}

/// Drop the cached dataset's freshness and refetch right away
async fn refresh_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    state.cache.invalidate().await;

    let load = state.cache.load().await.map_err(|e| {
        tracing::error!("Manual refresh failed: {}", e);
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;

    if let DatasetLoad::Stale { error, .. } = &load {
        warn!("Manual refresh failed, keeping stale dataset: {}", error);
    }

    Ok(Json(RefreshResponse {
        refreshed: !load.is_stale(),
        routes: load.dataset().len(),
    }))
}

#[derive(Serialize)]
struct RefreshResponse {
    refreshed: bool,
    routes: usize,
}

/// Routes closest to a coordinate
async fn nearest_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<Vec<Route>>, ApiError> {
    let params = query
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let dataset = current_dataset(&state).await?;
    let routes =
        run_query(move || nearest_routes(&dataset, params.point, params.count)).await?;

    Ok(Json(routes))
}

/// Unique points whose region touches a viewport
async fn viewport_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewportQuery>,
) -> Result<Json<Vec<Arc<Point>>>, ApiError> {
    let params = query
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let dataset = current_dataset(&state).await?;
    let points =
        run_query(move || points_in_viewport(&dataset, params.corner1, params.corner2)).await?;

    Ok(Json(points))
}
