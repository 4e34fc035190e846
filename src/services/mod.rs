pub mod alert_engine;
pub mod clock;
pub mod feed_monitor;
pub mod kv_store;
pub mod news_feed;
pub mod time_format;
