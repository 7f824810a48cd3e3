use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use onekamer_media::config::AppConfig;
use onekamer_media::resolver::MediaResolver;
use onekamer_media::routes::{health, media};
use onekamer_media::AppState;
use onekamer_shared::clients::storage::StorageClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    onekamer_shared::middleware::init_tracing("onekamer-media");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let metrics_handle = onekamer_shared::middleware::init_metrics();

    let storage = StorageClient::new(&config.storage_url, &config.storage_service_key)?;
    let resolver = MediaResolver::new(storage, config.cdn_base_url.clone());

    let state = Arc::new(AppState {
        config,
        resolver,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/media/resolve", get(media::resolve_media))
        .layer(axum::middleware::from_fn(
            onekamer_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "onekamer-media starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
