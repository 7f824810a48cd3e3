use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_storage_url")]
    pub storage_url: String,
    #[serde(default = "default_storage_service_key")]
    pub storage_service_key: String,
    #[serde(default = "default_cdn_base_url")]
    pub cdn_base_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

fn default_port() -> u16 { 3011 }
fn default_storage_url() -> String { "http://localhost:54321/storage/v1".into() }
fn default_storage_service_key() -> String { "development-service-key".into() }
fn default_cdn_base_url() -> String { "https://cdn.onekamer.co".into() }
fn default_jwt_secret() -> String { "development-secret-change-in-production".into() }

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ONEKAMER_MEDIA").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|_| Self {
            port: default_port(),
            storage_url: default_storage_url(),
            storage_service_key: default_storage_service_key(),
            cdn_base_url: default_cdn_base_url(),
            jwt_secret: default_jwt_secret(),
        }))
    }
}
