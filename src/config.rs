use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
    Mongo,
}

impl StoreBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(StoreBackend::Memory),
            "file" => Some(StoreBackend::File),
            "mongo" | "mongodb" => Some(StoreBackend::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub prefs_file: String,
    pub prefs_key: String,

    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub feed_url: String,
    pub feed_poll_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let store_backend = env::var("PREFS_STORE")
        .ok()
        .and_then(|s| StoreBackend::parse(&s))
        .unwrap_or(StoreBackend::File);

    let prefs_file =
        env::var("PREFS_FILE").unwrap_or_else(|_| "data/preferences.json".to_string());
    let prefs_key = env::var("PREFS_KEY")
        .unwrap_or_else(|_| crate::services::alert_engine::DEFAULT_STORAGE_KEY.to_string());

    let mongodb_uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mongodb_db = env::var("MONGODB_DB").unwrap_or_else(|_| "commoditypulse".to_string());

    let feed_url = env::var("FEED_URL").unwrap_or_default();
    let feed_poll_secs = env::var("FEED_POLL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);

    Settings {
        host,
        port,
        store_backend,
        prefs_file,
        prefs_key,
        mongodb_uri,
        mongodb_db,
        feed_url,
        feed_poll_secs,
    }
}
