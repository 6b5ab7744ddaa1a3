//! Core trait definitions for persistence and the external oracles.
//!
//! These async traits are implemented by the `wordbank-store` and
//! `wordbank-oracles` crates respectively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, StoreError};
use crate::model::{ErrorKind, PartOfSpeech, ProficiencyLevel};

// ---------------------------------------------------------------------------
// Entry store
// ---------------------------------------------------------------------------

/// String key-value store. Values are opaque to the store.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Read a value; `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// Grading oracle
// ---------------------------------------------------------------------------

/// Grades a learner's sentence that uses a target word.
#[async_trait]
pub trait GradingOracle: Send + Sync {
    /// Human-readable oracle name (e.g. "ai-grader").
    fn name(&self) -> &str;

    async fn grade(&self, request: &GradeRequest) -> Result<GradingFeedback, OracleError>;
}

/// Request to grade one practice sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub sentence: String,
    /// Model alias override; the oracle's default when `None`.
    #[serde(default)]
    pub model: Option<String>,
}

/// One mistake found in a graded sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub correction: String,
    #[serde(default)]
    pub explanation: String,
}

/// Structured feedback returned by a grading oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingFeedback {
    /// 0–100.
    pub score: u8,
    pub is_correct: bool,
    pub errors: Vec<SentenceError>,
    pub suggestions: Vec<String>,
    pub improved_version: String,
    pub overall_comment: String,
    pub proficiency_assessment: ProficiencyLevel,
}

// ---------------------------------------------------------------------------
// Lookup oracle
// ---------------------------------------------------------------------------

/// Dictionary lookup used to autofill entry fields.
#[async_trait]
pub trait LookupOracle: Send + Sync {
    /// Look up `word` as the given part of speech.
    ///
    /// Fails with [`OracleError::NotFound`] when the dictionary has nothing
    /// and [`OracleError::UnsupportedInput`] for inputs it cannot look up,
    /// so callers can pick a fallback.
    async fn lookup(
        &self,
        word: &str,
        part_of_speech: PartOfSpeech,
    ) -> Result<DictionaryEntry, OracleError>;
}

/// Best-effort dictionary data for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub phonetic: String,
    pub definition: String,
    pub examples: Vec<String>,
    #[serde(rename = "audioUrlUK")]
    pub audio_url_uk: String,
    #[serde(rename = "audioUrlUS")]
    pub audio_url_us: String,
}

// ---------------------------------------------------------------------------
// Language assistant
// ---------------------------------------------------------------------------

/// Spelling, translation and example-correction helpers.
#[async_trait]
pub trait LanguageAssistant: Send + Sync {
    async fn spell_check(&self, word: &str) -> Result<SpellCheck, OracleError>;

    /// Translate English text into Traditional Chinese.
    async fn translate(&self, text: &str) -> Result<String, OracleError>;

    /// Rewrite a learner's example sentence into natural English.
    async fn correct_example(
        &self,
        word: &str,
        part_of_speech: PartOfSpeech,
        example: &str,
    ) -> Result<ExampleCorrection, OracleError>;
}

/// Result of a spell check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheck {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub is_correctable: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Result of correcting an example sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCorrection {
    pub corrected: String,
    /// Whether `corrected` still contains the target word.
    pub contains_target: bool,
    /// A sentence using the target word, when `corrected` lost it.
    pub suggestion: Option<String>,
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Pull the JSON object out of a chat model reply.
///
/// Handles:
/// - ```json fenced blocks and bare ``` fences
/// - prose before or after the object (takes the outermost `{ ... }`)
///
/// Returns `None` when no object is present.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let mut text = response.trim();

    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        // Skip the info string ("json", "JSON", ...) up to the end of the line.
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        text = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if first < last {
        Some(text[first..=last].trim())
    } else {
        None
    }
}

/// Returns `true` if a reply is the literal JSON `null` (possibly fenced),
/// which the prompts use to signal "nothing found".
pub fn is_null_reply(response: &str) -> bool {
    let cleaned = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    cleaned == "null"
}
