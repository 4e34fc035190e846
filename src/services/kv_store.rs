use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::doc,
    options::UpdateOptions,
    Collection, Database,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// String key/value persistence the alert engine reads and writes through.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ---------------- Memory ----------------

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------- JSON file ----------------

/// All keys live in one JSON object on disk. A missing file reads as empty.
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write of the file within this process
    lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        Ok(all.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&all)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

// ---------------- MongoDB ----------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    #[serde(rename = "_id")]
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

pub struct MongoStore {
    collection: Collection<KvEntry>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<KvEntry>("kv"),
        }
    }
}

#[async_trait]
impl KvStore for MongoStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entry = self.collection.find_one(doc! { "_id": key }, None).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let opts = UpdateOptions::builder().upsert(true).build();

        self.collection
            .update_one(
                doc! { "_id": key },
                doc! { "$set": { "value": value, "updated_at": Utc::now().timestamp() } },
                opts,
            )
            .await?;

        Ok(())
    }
}
