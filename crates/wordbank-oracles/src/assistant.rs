//! Chat-model backed language helpers: spell check, translation and
//! example correction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use wordbank_core::error::OracleError;
use wordbank_core::model::PartOfSpeech;
use wordbank_core::traits::{
    extract_json_object, ExampleCorrection, LanguageAssistant, SpellCheck,
};

use crate::chat::{ChatModel, ChatRequest};

pub struct AiAssistant {
    chat: Arc<dyn ChatModel>,
    model: String,
}

impl AiAssistant {
    pub fn new(chat: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    async fn ask(&self, prompt: String, max_tokens: u32) -> Result<String, OracleError> {
        let request = ChatRequest::new(self.model.clone(), prompt).with_max_tokens(max_tokens);
        let reply = self.chat.complete(&request).await?;
        debug!(model = %reply.model, chars = reply.content.len(), "assistant reply received");
        Ok(reply.content)
    }
}

fn require(value: &str, what: &str) -> Result<(), OracleError> {
    if value.trim().is_empty() {
        Err(OracleError::Validation(format!("please provide {what}")))
    } else {
        Ok(())
    }
}

#[async_trait]
impl LanguageAssistant for AiAssistant {
    #[instrument(skip(self))]
    async fn spell_check(&self, word: &str) -> Result<SpellCheck, OracleError> {
        require(word, "a word")?;
        let reply = self.ask(spell_check_prompt(word.trim()), 1000).await?;
        Ok(parse_spell_check(&reply))
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn translate(&self, text: &str) -> Result<String, OracleError> {
        require(text, "text to translate")?;
        let reply = self.ask(translate_prompt(text.trim()), 1000).await?;
        let translation = clean_translation(&reply);
        if translation.is_empty() {
            return Err(OracleError::MalformedResponse(
                "empty translation".into(),
            ));
        }
        Ok(translation)
    }

    #[instrument(skip(self, example))]
    async fn correct_example(
        &self,
        word: &str,
        part_of_speech: PartOfSpeech,
        example: &str,
    ) -> Result<ExampleCorrection, OracleError> {
        require(word, "a word")?;
        require(example, "an example sentence")?;
        let reply = self
            .ask(correct_example_prompt(word.trim(), part_of_speech, example.trim()), 1500)
            .await?;
        Ok(parse_correction(&reply, word.trim()))
    }
}

fn spell_check_prompt(word: &str) -> String {
    format!(
        r#"Analyse this English word: "{word}"

Decide:
1. Is it a correctly spelled English word?
2. If it is a plural, what is the singular?
3. If the spelling may be wrong, suggest the correct spelling
4. If it looks like a typo (extra, missing or swapped letters), suggest fixes

Reply with JSON only:
{{
  "isCorrect": true/false,
  "isCorrectable": true/false,
  "message": "short explanation",
  "suggestions": ["suggestion 1", "suggestion 2", "suggestion 3"]
}}

If the word is correct and not a plural, suggestions is an empty array.
If it is a plural, suggestions contains the singular form."#
    )
}

fn translate_prompt(text: &str) -> String {
    format!(
        "Translate the following English into Traditional Chinese as used in Taiwan:\n\n\"{text}\"\n\nReply with the translation only, no explanation."
    )
}

fn correct_example_prompt(word: &str, part_of_speech: PartOfSpeech, example: &str) -> String {
    format!(
        r#"You are an English teacher who helps Chinese speakers make their English sound natural.

Target word or phrase: {word} ({part_of_speech})
Learner's example sentence: "{example}"

Tasks:
1. Fix any unnatural or Chinese-influenced English
2. Check whether the corrected sentence still contains "{word}"
3. If it does not, also give a natural example sentence that uses "{word}"

Reply with JSON only, no markdown:
{{
  "corrected": "the corrected sentence (the original if it is already correct)",
  "containsTarget": true/false,
  "suggestion": "a sentence using the word when the correction lost it, otherwise null"
}}"#
    )
}

/// Parse a spell-check reply. Non-JSON replies become an uncorrectable
/// result carrying the raw text as the message.
pub fn parse_spell_check(reply: &str) -> SpellCheck {
    extract_json_object(reply)
        .and_then(|json| serde_json::from_str::<SpellCheck>(json).ok())
        .unwrap_or_else(|| SpellCheck {
            is_correct: false,
            is_correctable: false,
            message: reply.trim().to_string(),
            suggestions: Vec::new(),
        })
}

/// Trim whitespace and the quotes models like to wrap translations in.
pub fn clean_translation(reply: &str) -> String {
    let trimmed = reply.trim();
    let unquoted = ['"', '「', '“']
        .iter()
        .zip(['"', '」', '”'])
        .find_map(|(open, close)| {
            trimmed
                .strip_prefix(*open)
                .and_then(|rest| rest.strip_suffix(close))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCorrection {
    #[serde(default)]
    corrected: Option<String>,
    #[serde(default)]
    contains_target: Option<bool>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Parse an example-correction reply. A reply that is not JSON is taken as
/// the corrected sentence itself.
pub fn parse_correction(reply: &str, word: &str) -> ExampleCorrection {
    let parsed = extract_json_object(reply)
        .and_then(|json| serde_json::from_str::<RawCorrection>(json).ok());

    let Some(raw) = parsed else {
        return ExampleCorrection {
            corrected: reply.trim().to_string(),
            contains_target: true,
            suggestion: None,
        };
    };

    let corrected = raw.corrected.unwrap_or_default().trim().to_string();
    let contains_target = raw
        .contains_target
        .unwrap_or_else(|| corrected.to_lowercase().contains(&word.to_lowercase()));
    let suggestion = if contains_target {
        None
    } else {
        raw.suggestion
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    ExampleCorrection {
        corrected,
        contains_target,
        suggestion,
    }
}
