pub mod config;
pub mod events;
pub mod formatter;
pub mod models;
pub mod router;
pub mod routes;
pub mod schema;
pub mod services;

use onekamer_shared::clients::db::DbPool;
use onekamer_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub db: DbPool,
    pub config: config::AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
