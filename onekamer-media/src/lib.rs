pub mod buckets;
pub mod config;
pub mod epoch;
pub mod resolver;
pub mod routes;

use onekamer_shared::clients::storage::StorageClient;

pub struct AppState {
    pub config: config::AppConfig,
    pub resolver: resolver::MediaResolver<StorageClient>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
