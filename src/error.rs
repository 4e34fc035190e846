use thiserror::Error;

/// Failures raised by a [`crate::services::kv_store::KvStore`] adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("persistence read error: {0}")]
    PersistenceRead(String),

    #[error("persistence write error: {0}")]
    PersistenceWrite(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
