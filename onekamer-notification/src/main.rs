use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use onekamer_notification::config::AppConfig;
use onekamer_notification::{events, routes, AppState};
use onekamer_shared::clients::db::create_pool;
use onekamer_shared::clients::rabbitmq::RabbitMQClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    onekamer_shared::middleware::init_tracing("onekamer-notification");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let metrics_handle = onekamer_shared::middleware::init_metrics();

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        metrics_handle,
    });

    // Spawn echange event subscriber
    let echange_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_echange_events(echange_state).await {
            tracing::error!(error = %e, "echange event subscriber failed");
        }
    });

    // Spawn groupes event subscriber
    let groupes_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_groupes_events(groupes_state).await {
            tracing::error!(error = %e, "groupes event subscriber failed");
        }
    });

    // Spawn rencontre event subscriber
    let rencontre_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_rencontre_events(rencontre_state).await {
            tracing::error!(error = %e, "rencontre event subscriber failed");
        }
    });

    // Spawn commerce event subscriber
    let commerce_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_commerce_events(commerce_state).await {
            tracing::error!(error = %e, "commerce event subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/notifications", get(routes::notifications::list_notifications))
        .route("/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/notifications/mark-all-read", post(routes::notifications::mark_all_read))
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .layer(axum::middleware::from_fn(
            onekamer_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "onekamer-notification starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
