use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::open_meteo::OpenMeteoClient;
use crate::config::Config;
use crate::db::Store;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Officeboard/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub weather: Arc<OpenMeteoClient>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.weather.request_timeout_seconds)?;
        let weather = Arc::new(OpenMeteoClient::with_shared_client(
            http_client,
            config.weather.base_url.clone(),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            weather,
        })
    }
}
