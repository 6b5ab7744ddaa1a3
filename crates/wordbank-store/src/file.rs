//! Single-file JSON store.
//!
//! The file holds one JSON object mapping keys to their string values. It is
//! read once on open; every mutation rewrites the whole file through a
//! temporary sibling and a rename, so a crash never leaves a torn file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use wordbank_core::error::StoreError;
use wordbank_core::traits::EntryStore;

/// File name used inside a data directory.
pub const DEFAULT_FILE_NAME: &str = "entries.json";

pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store file at `path`.
    ///
    /// A file that is not a JSON object of strings is an error, never
    /// treated as empty: the next write would replace it.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = data.len(), "opened store");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Open `entries.json` inside `dir`, creating the directory if needed.
    pub async fn in_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        Self::open(dir.join(DEFAULT_FILE_NAME)).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(data)?;

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let previous = data.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&data).await {
            // keep memory consistent with disk
            match previous {
                Some(old) => data.insert(key.to_string(), old),
                None => data.remove(key),
            };
            return Err(e);
        }
        debug!(key, "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let Some(previous) = data.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&data).await {
            data.insert(key.to_string(), previous);
            return Err(e);
        }
        debug!(key, "deleted value");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .data
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
