//! Non-persistent store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use wordbank_core::error::StoreError;
use wordbank_core::traits::EntryStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every key under `prefix` out of `source`.
    ///
    /// Writes to the copy never reach `source`, which is what `--dry-run`
    /// relies on.
    pub async fn snapshot(source: &dyn EntryStore, prefix: &str) -> Result<Self, StoreError> {
        let mut data = HashMap::new();
        for key in source.list(prefix).await? {
            if let Some(value) = source.get(&key).await? {
                data.insert(key, value);
            }
        }
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .data
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
