use std::sync::Arc;

use tracing::{info, warn};

use super::{
    config::Config,
    store::{MemoryStore, PgStore, Store},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                info!("Connecting to Postgres...");
                Arc::new(PgStore::connect(url).await.expect("Database misconfigured!"))
            }
            None => {
                warn!("DATABASE_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Arc::new(Self { config, store })
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
