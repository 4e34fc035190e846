use std::{net::SocketAddr, sync::Arc};

use commoditypulse::{
    config::{self, StoreBackend},
    routes,
    services::{
        clock::SystemClock,
        feed_monitor,
        kv_store::{FileStore, KvStore, MemoryStore, MongoStore},
    },
    AppState,
};
use mongodb::Client;
use tracing_subscriber::EnvFilter;

async fn build_store(settings: &config::Settings) -> Result<Arc<dyn KvStore>, String> {
    let store: Arc<dyn KvStore> = match settings.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::new(&settings.prefs_file)),
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri)
                .await
                .map_err(|e| format!("failed to connect to MongoDB: {e}"))?;
            Arc::new(MongoStore::new(&client.database(&settings.mongodb_db)))
        }
    };

    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();
    tracing::info!(backend = ?settings.store_backend, key = %settings.prefs_key, "preference store");

    let store = build_store(&settings).await?;
    let state = AppState::new(settings.clone(), store, Arc::new(SystemClock));

    let prefs = state.engine.load().await;
    tracing::info!(frequency = %prefs.frequency, min_impact = %prefs.min_impact, "preferences loaded");

    if state.feed.is_configured() {
        feed_monitor::spawn_feed_monitor(state.clone());
    } else {
        tracing::info!("FEED_URL not set, feed monitor disabled");
    }

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
