//! Library entrypoint for CommodityPulse.
//!
//! The binary only wires things together; integration tests under `tests/`
//! build their own `AppState` over an in-memory store.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    alert_engine::{AlertDecisionEngine, EngineConfig},
    clock::Clock,
    kv_store::KvStore,
    news_feed::NewsFeedClient,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub engine: Arc<AlertDecisionEngine>,
    pub feed: NewsFeedClient,
    pub events_tx: tokio::sync::broadcast::Sender<events::ServerEvent>,
}

impl AppState {
    pub fn new(settings: config::Settings, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        let engine = AlertDecisionEngine::new(
            store,
            clock,
            EngineConfig {
                storage_key: settings.prefs_key.clone(),
            },
        );
        let feed = NewsFeedClient::new(settings.feed_url.clone());
        let (events_tx, _events_rx) = tokio::sync::broadcast::channel(64);

        Self {
            settings,
            engine: Arc::new(engine),
            feed,
            events_tx,
        }
    }
}
