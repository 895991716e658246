//! Local persistence for submitted test cases.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use websteps_common::action::Action;

pub const TEST_CASES_KEY: &str = "testCases";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store file {0} is not a JSON object")]
    Corrupt(PathBuf),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Key-value store persisted as a single JSON object file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Corrupt(self.path.clone())),
        }
    }

    async fn write_map(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(map).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(map).await?;
        }
        Ok(())
    }
}

/// A test case submitted to the remote service, kept locally for reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTestCase {
    pub test_case_name: String,
    pub project_id: String,
    #[serde(default)]
    pub description: String,
    pub recorded_actions: Vec<Action>,
    #[serde(default)]
    pub steps: Vec<String>,
    /// Unix seconds.
    pub recorded_at: u64,
    pub url: String,
    pub status: String,
    #[serde(default)]
    pub remote_id: Option<String>,
}

/// Append-only list of [`StoredTestCase`] records under the `testCases` key.
pub struct TestCaseHistory<K: KeyValueStore + ?Sized> {
    store: Arc<K>,
}

impl<K: KeyValueStore + ?Sized> Clone for TestCaseHistory<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K: KeyValueStore + ?Sized> TestCaseHistory<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    /// Creates an empty list if the key has never been written.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if self.store.get(TEST_CASES_KEY).await?.is_none() {
            self.store.set(TEST_CASES_KEY, Value::Array(Vec::new())).await?;
            debug!("Storage initialized");
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<StoredTestCase>, StoreError> {
        match self.store.get(TEST_CASES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn append(&self, record: StoredTestCase) -> Result<usize, StoreError> {
        let mut records = self.list().await?;
        records.push(record);
        let count = records.len();
        self.store
            .set(TEST_CASES_KEY, serde_json::to_value(records)?)
            .await?;
        Ok(count)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.set(TEST_CASES_KEY, Value::Array(Vec::new())).await
    }
}
