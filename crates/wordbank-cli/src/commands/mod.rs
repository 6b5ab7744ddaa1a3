pub mod add;
pub mod assist;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod list_models;
pub mod lookup;
pub mod practice;
pub mod show;
pub mod stats;
pub mod transfer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use wordbank_core::model::Entry;
use wordbank_core::repository::{WordRepository, ENTRY_KEY_PREFIX};
use wordbank_oracles::config::load_config_from;
use wordbank_oracles::WordbankConfig;
use wordbank_store::{JsonFileStore, MemoryStore};

/// Flags shared by every subcommand.
pub struct Globals {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl Globals {
    pub fn load_config(&self) -> Result<WordbankConfig> {
        load_config_from(self.config.as_deref())
    }

    /// `--data-dir` wins over the config file.
    pub fn data_dir(&self, config: &WordbankConfig) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| config.data_dir())
    }

    pub async fn open_repository(&self) -> Result<(WordbankConfig, WordRepository)> {
        let config = self.load_config()?;
        let dir = self.data_dir(&config);
        debug!(dir = %dir.display(), "opening data directory");
        let store = JsonFileStore::in_dir(&dir)
            .await
            .with_context(|| format!("failed to open data directory: {}", dir.display()))?;
        if !self.dry_run {
            return Ok((config, WordRepository::new(Arc::new(store))));
        }
        debug!("dry run: changes stay in memory");
        let copy = MemoryStore::snapshot(&store, ENTRY_KEY_PREFIX)
            .await
            .context("failed to read entries for dry run")?;
        Ok((config, WordRepository::new(Arc::new(copy))))
    }
}

pub async fn find_entry(repository: &WordRepository, id: &str) -> Result<Entry> {
    repository
        .get(id)
        .await?
        .with_context(|| format!("no entry with id '{id}'"))
}
