//! Core data model types for wordbank.
//!
//! Entries are persisted as camelCase JSON, the same shape the browser
//! version of the app kept in local storage, so existing exports load as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grammatical category of a word or phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartOfSpeech {
    #[default]
    Verb,
    Noun,
    Adjective,
    Adverb,
    PhrasalVerb,
    Phrase,
    Other,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 7] = [
        PartOfSpeech::Verb,
        PartOfSpeech::Noun,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::PhrasalVerb,
        PartOfSpeech::Phrase,
        PartOfSpeech::Other,
    ];

    /// Dictionary-style abbreviation, e.g. `adj.`.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            PartOfSpeech::Verb => "v.",
            PartOfSpeech::Noun => "n.",
            PartOfSpeech::Adjective => "adj.",
            PartOfSpeech::Adverb => "adv.",
            PartOfSpeech::PhrasalVerb => "phr. v.",
            PartOfSpeech::Phrase => "phrase",
            PartOfSpeech::Other => "other",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartOfSpeech::Verb => write!(f, "verb"),
            PartOfSpeech::Noun => write!(f, "noun"),
            PartOfSpeech::Adjective => write!(f, "adjective"),
            PartOfSpeech::Adverb => write!(f, "adverb"),
            PartOfSpeech::PhrasalVerb => write!(f, "phrasal-verb"),
            PartOfSpeech::Phrase => write!(f, "phrase"),
            PartOfSpeech::Other => write!(f, "other"),
        }
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verb" | "v" => Ok(PartOfSpeech::Verb),
            "noun" | "n" => Ok(PartOfSpeech::Noun),
            "adjective" | "adj" => Ok(PartOfSpeech::Adjective),
            "adverb" | "adv" => Ok(PartOfSpeech::Adverb),
            "phrasal-verb" | "phrasal_verb" | "phrasal verb" => Ok(PartOfSpeech::PhrasalVerb),
            "phrase" | "idiom" => Ok(PartOfSpeech::Phrase),
            "other" => Ok(PartOfSpeech::Other),
            other => Err(format!("unknown part of speech: {other}")),
        }
    }
}

/// Chinese and English definitions; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub chinese: String,
    #[serde(default)]
    pub english: String,
}

/// Example sentences attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    /// Reference sentences. May contain `**bold**` markup.
    #[serde(default)]
    pub original: Vec<String>,
    /// The learner's own sentence.
    #[serde(default)]
    pub my_own: String,
    /// AI-corrected version of `my_own`.
    #[serde(default)]
    pub ai_corrected: String,
    /// AI-proposed sentence when the correction lost the target word.
    #[serde(default)]
    pub ai_suggestion: String,
}

/// Pronunciation data. Not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    #[serde(default)]
    pub phonetic: String,
    #[serde(default, rename = "audioUrl")]
    pub audio_url: String,
    #[serde(default, rename = "audioUrlUK")]
    pub audio_url_uk: String,
    #[serde(default, rename = "audioUrlUS")]
    pub audio_url_us: String,
}

/// Where the learner met the word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub url: String,
}

/// A vocabulary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier, assigned on creation and never changed.
    pub id: String,
    /// The word or phrase, trimmed.
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    /// Creation time, never changed after creation.
    pub added_date: DateTime<Utc>,
    #[serde(default)]
    pub definitions: Definitions,
    #[serde(default)]
    pub examples: Examples,
    #[serde(default)]
    pub pronunciation: Pronunciation,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Present once the entry has been practiced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_stats: Option<PracticeStats>,
    /// Fields this version does not know about (e.g. `reviewHistory`).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entry {
    /// Number of graded practice attempts, 0 if never practiced.
    pub fn total_practices(&self) -> u32 {
        self.practice_stats
            .as_ref()
            .map(|s| s.total_practices)
            .unwrap_or(0)
    }

    pub fn is_practiced(&self) -> bool {
        self.total_practices() > 0
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Coarse skill tier derived from recent scores and attempt count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Mastered,
}

impl ProficiencyLevel {
    /// Star rating shown next to the level (1–4).
    pub fn stars(&self) -> u8 {
        match self {
            ProficiencyLevel::Beginner => 1,
            ProficiencyLevel::Intermediate => 2,
            ProficiencyLevel::Advanced => 3,
            ProficiencyLevel::Mastered => 4,
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProficiencyLevel::Beginner => write!(f, "beginner"),
            ProficiencyLevel::Intermediate => write!(f, "intermediate"),
            ProficiencyLevel::Advanced => write!(f, "advanced"),
            ProficiencyLevel::Mastered => write!(f, "mastered"),
        }
    }
}

/// Category of a mistake reported by the grading oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Grammar,
    Usage,
    WordChoice,
    Spelling,
    #[serde(other)]
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Grammar => write!(f, "grammar"),
            ErrorKind::Usage => write!(f, "usage"),
            ErrorKind::WordChoice => write!(f, "word-choice"),
            ErrorKind::Spelling => write!(f, "spelling"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

/// A recurring mistake and how often it has been made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPattern {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub pattern: String,
    pub count: u32,
}

/// Cumulative practice statistics for one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    #[serde(default)]
    pub total_practices: u32,
    #[serde(default)]
    pub last_practice_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub proficiency_level: ProficiencyLevel,
    /// Most frequent mistakes, descending by count.
    #[serde(default)]
    pub common_errors: Vec<ErrorPattern>,
    /// Rounded mean of `recent_scores`; `None` when there are no scores.
    #[serde(default)]
    pub average_score: Option<u8>,
    /// The last few scores, oldest first.
    #[serde(default)]
    pub recent_scores: Vec<u8>,
}

/// User-supplied values for creating or editing an entry.
///
/// Start from [`EntryDraft::default`] (or [`EntryDraft::new`]) and override
/// the fields you have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub definition_chinese: String,
    pub definition_english: String,
    pub examples_original: Vec<String>,
    pub my_example: String,
    pub ai_corrected: String,
    pub ai_suggestion: String,
    pub phonetic: String,
    pub audio_url: String,
    pub audio_url_uk: String,
    pub audio_url_us: String,
    pub context: Context,
    pub tags: Vec<String>,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            word: String::new(),
            part_of_speech: PartOfSpeech::Verb,
            definition_chinese: String::new(),
            definition_english: String::new(),
            examples_original: vec![String::new()],
            my_example: String::new(),
            ai_corrected: String::new(),
            ai_suggestion: String::new(),
            phonetic: String::new(),
            audio_url: String::new(),
            audio_url_uk: String::new(),
            audio_url_us: String::new(),
            context: Context::default(),
            tags: Vec::new(),
        }
    }
}

impl EntryDraft {
    pub fn new(word: impl Into<String>, part_of_speech: PartOfSpeech) -> Self {
        Self {
            word: word.into(),
            part_of_speech,
            ..Self::default()
        }
    }

    /// Load an existing entry for editing.
    pub fn from_entry(entry: &Entry) -> Self {
        let examples_original = if entry.examples.original.is_empty() {
            vec![String::new()]
        } else {
            entry.examples.original.clone()
        };
        Self {
            word: entry.word.clone(),
            part_of_speech: entry.part_of_speech,
            definition_chinese: entry.definitions.chinese.clone(),
            definition_english: entry.definitions.english.clone(),
            examples_original,
            my_example: entry.examples.my_own.clone(),
            ai_corrected: entry.examples.ai_corrected.clone(),
            ai_suggestion: entry.examples.ai_suggestion.clone(),
            phonetic: entry.pronunciation.phonetic.clone(),
            audio_url: entry.pronunciation.audio_url.clone(),
            audio_url_uk: entry.pronunciation.audio_url_uk.clone(),
            audio_url_us: entry.pronunciation.audio_url_us.clone(),
            context: entry.context.clone(),
            tags: entry.tags.clone(),
        }
    }

    pub fn with_definitions(
        mut self,
        chinese: impl Into<String>,
        english: impl Into<String>,
    ) -> Self {
        self.definition_chinese = chinese.into();
        self.definition_english = english.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        let example = example.into();
        match self.examples_original.iter_mut().find(|e| e.trim().is_empty()) {
            Some(slot) => *slot = example,
            None => self.examples_original.push(example),
        }
        self
    }

    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = phonetic.into();
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.add_tag(tag);
        self
    }

    /// Add a trimmed tag. Returns `false` for blank or duplicate tags.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Reject drafts that cannot become an entry.
    pub fn validate(&self) -> Result<(), String> {
        if self.word.trim().is_empty() {
            return Err("please enter a word".to_string());
        }
        Ok(())
    }
}
