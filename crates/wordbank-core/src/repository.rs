//! Entry persistence on top of an [`EntryStore`].
//!
//! Each entry is stored as one JSON value under its id. Ids share the
//! [`ENTRY_KEY_PREFIX`] namespace so the store may hold other keys too.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{RepositoryError, StoreError};
use crate::model::{Definitions, Entry, EntryDraft, Examples, PartOfSpeech, Pronunciation};
use crate::traits::EntryStore;

/// Key prefix shared by every entry.
pub const ENTRY_KEY_PREFIX: &str = "vocab:";

/// Loads, saves and deletes vocabulary entries.
#[derive(Clone)]
pub struct WordRepository {
    store: Arc<dyn EntryStore>,
}

impl WordRepository {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Every readable entry, newest first.
    ///
    /// Never fails: unreadable records are skipped and a store outage yields
    /// an empty list. Both are logged.
    pub async fn load_all(&self) -> Vec<Entry> {
        let keys = match self.store.list(ENTRY_KEY_PREFIX).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to list entries, showing an empty collection");
                return Vec::new();
            }
        };

        let reads = join_all(keys.iter().map(|key| self.store.get(key))).await;

        let mut entries = Vec::with_capacity(keys.len());
        for (key, read) in keys.iter().zip(reads) {
            match read {
                Ok(Some(raw)) => match serde_json::from_str::<Entry>(&raw) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!(key = %key, error = %e, "skipping unreadable entry"),
                },
                Ok(None) => debug!(key = %key, "entry removed during load"),
                Err(e) => warn!(key = %key, error = %e, "failed to read entry"),
            }
        }

        entries.sort_by(|a, b| b.added_date.cmp(&a.added_date));
        debug!(count = entries.len(), "loaded entries");
        entries
    }

    /// The entry stored under `id`, if any.
    pub async fn get(&self, id: &str) -> Result<Option<Entry>, RepositoryError> {
        check_id(id)?;
        let Some(raw) = self.store.get(id).await? else {
            return Ok(None);
        };
        let entry = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    /// Create a new entry from `draft`, or update `existing` with it.
    pub async fn save(
        &self,
        draft: &EntryDraft,
        existing: Option<&Entry>,
    ) -> Result<Entry, RepositoryError> {
        self.save_at(draft, existing, Utc::now()).await
    }

    /// [`save`](Self::save) with an explicit clock.
    pub async fn save_at(
        &self,
        draft: &EntryDraft,
        existing: Option<&Entry>,
        now: DateTime<Utc>,
    ) -> Result<Entry, RepositoryError> {
        draft.validate().map_err(RepositoryError::Validation)?;

        let entry = build_entry(draft, existing, now);
        self.write(&entry).await?;

        info!(
            id = %entry.id,
            word = %entry.word,
            created = existing.is_none(),
            "saved entry"
        );
        Ok(entry)
    }

    /// Persist a whole entry as-is, e.g. after updating its practice stats.
    pub async fn update(&self, entry: &Entry) -> Result<(), RepositoryError> {
        check_id(&entry.id)?;
        self.write(entry).await?;
        debug!(id = %entry.id, "updated entry");
        Ok(())
    }

    /// Remove an entry. Deleting a missing entry succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        check_id(id)?;
        self.store.delete(id).await?;
        info!(id = %id, "deleted entry");
        Ok(())
    }

    /// Write every loadable entry as a pretty JSON array. Returns the count.
    pub async fn export_json<W: Write>(&self, writer: W) -> Result<usize, RepositoryError> {
        let entries = self.load_all().await;
        serde_json::to_writer_pretty(writer, &entries).map_err(StoreError::from)?;
        info!(count = entries.len(), "exported entries");
        Ok(entries.len())
    }

    /// Upsert entries from a JSON array by id. Returns how many were written.
    ///
    /// The whole document is parsed and checked first; a bad record aborts
    /// the import before anything is written.
    pub async fn import_json<R: Read>(&self, reader: R) -> Result<usize, RepositoryError> {
        let entries: Vec<Entry> = serde_json::from_reader(reader).map_err(StoreError::from)?;

        let mut seen = HashSet::new();
        for entry in &entries {
            check_id(&entry.id)?;
            if entry.word.trim().is_empty() {
                return Err(RepositoryError::Validation(format!(
                    "entry {} has no word",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(RepositoryError::Validation(format!(
                    "duplicate entry id {}",
                    entry.id
                )));
            }
        }

        for entry in &entries {
            self.write(entry).await?;
        }
        info!(count = entries.len(), "imported entries");
        Ok(entries.len())
    }

    async fn write(&self, entry: &Entry) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(entry).map_err(StoreError::from)?;
        self.store.set(&entry.id, &value).await?;
        Ok(())
    }
}

fn check_id(id: &str) -> Result<(), RepositoryError> {
    match id.strip_prefix(ENTRY_KEY_PREFIX) {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(RepositoryError::InvalidId(id.to_string())),
    }
}

/// `vocab:{word}-{pos}-{millis}-{random}`; the random suffix keeps two saves
/// within the same millisecond apart.
pub fn new_entry_id(word: &str, part_of_speech: PartOfSpeech, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{ENTRY_KEY_PREFIX}{word}-{part_of_speech}-{millis}-{rand}",
        millis = now.timestamp_millis(),
        rand = &suffix[..8],
    )
}

/// Normalize a draft into an entry. Edits keep id, creation date, practice
/// stats and unknown fields of `existing`.
fn build_entry(draft: &EntryDraft, existing: Option<&Entry>, now: DateTime<Utc>) -> Entry {
    let word = draft.word.trim().to_string();

    let mut tags: Vec<String> = Vec::new();
    for tag in draft.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    let definitions = Definitions {
        chinese: draft.definition_chinese.clone(),
        english: draft.definition_english.clone(),
    };
    let examples = Examples {
        original: draft
            .examples_original
            .iter()
            .filter(|e| !e.trim().is_empty())
            .cloned()
            .collect(),
        my_own: draft.my_example.clone(),
        ai_corrected: draft.ai_corrected.clone(),
        ai_suggestion: draft.ai_suggestion.clone(),
    };
    let pronunciation = Pronunciation {
        phonetic: draft.phonetic.clone(),
        audio_url: draft.audio_url.clone(),
        audio_url_uk: draft.audio_url_uk.clone(),
        audio_url_us: draft.audio_url_us.clone(),
    };

    match existing {
        Some(existing) => Entry {
            word,
            part_of_speech: draft.part_of_speech,
            definitions,
            examples,
            pronunciation,
            context: draft.context.clone(),
            tags,
            ..existing.clone()
        },
        None => Entry {
            id: new_entry_id(&word, draft.part_of_speech, now),
            word,
            part_of_speech: draft.part_of_speech,
            added_date: now,
            definitions,
            examples,
            pronunciation,
            context: draft.context.clone(),
            tags,
            practice_stats: None,
            extra: Default::default(),
        },
    }
}
