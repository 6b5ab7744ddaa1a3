//! The `wordbank add` command.

use anyhow::Result;
use clap::Args;

use wordbank_core::error::OracleError;
use wordbank_core::model::{EntryDraft, PartOfSpeech};
use wordbank_core::traits::{DictionaryEntry, LookupOracle};

use super::Globals;

/// Entry fields settable from the command line.
#[derive(Args, Debug, Default)]
pub struct EntryFields {
    /// Chinese definition
    #[arg(long)]
    pub zh: Option<String>,

    /// English definition
    #[arg(long)]
    pub en: Option<String>,

    /// Reference example sentence (repeatable, `**word**` marks bold)
    #[arg(long = "example")]
    pub examples: Vec<String>,

    /// Your own example sentence
    #[arg(long)]
    pub my_example: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long)]
    pub phonetic: Option<String>,

    /// Where you met the word
    #[arg(long)]
    pub source: Option<String>,

    /// The situation it was used in
    #[arg(long)]
    pub scenario: Option<String>,

    #[arg(long)]
    pub url: Option<String>,
}

impl EntryFields {
    /// Overwrite the draft with every field that was given.
    pub fn apply(self, mut draft: EntryDraft) -> EntryDraft {
        if let Some(zh) = self.zh {
            draft.definition_chinese = zh;
        }
        if let Some(en) = self.en {
            draft.definition_english = en;
        }
        for example in self.examples {
            draft = draft.with_example(example);
        }
        if let Some(mine) = self.my_example {
            draft.my_example = mine;
        }
        for tag in &self.tags {
            draft.add_tag(tag);
        }
        if let Some(phonetic) = self.phonetic {
            draft.phonetic = phonetic;
        }
        if let Some(source) = self.source {
            draft.context.source = source;
        }
        if let Some(scenario) = self.scenario {
            draft.context.scenario = scenario;
        }
        if let Some(url) = self.url {
            draft.context.url = url;
        }
        draft
    }
}

pub async fn execute(
    globals: &Globals,
    word: String,
    pos: PartOfSpeech,
    lookup: bool,
    fields: EntryFields,
) -> Result<()> {
    let (config, repository) = globals.open_repository().await?;
    let mut draft = fields.apply(EntryDraft::new(word, pos));

    if lookup {
        let dictionary = config.build_dictionary()?;
        match dictionary.lookup(&draft.word, pos).await {
            Ok(found) => autofill(&mut draft, found),
            Err(OracleError::NotFound(_)) => {
                eprintln!("No dictionary entry for '{}', saving as entered.", draft.word.trim());
            }
            Err(OracleError::UnsupportedInput(_)) => {
                eprintln!("Phrases cannot be looked up, saving as entered.");
            }
            Err(e) => {
                eprintln!("Dictionary lookup failed ({e}), saving as entered.");
            }
        }
    }

    let entry = repository.save(&draft, None).await?;
    println!(
        "Saved {} ({}) as {}",
        entry.word,
        entry.part_of_speech.abbreviation(),
        entry.id
    );
    Ok(())
}

/// Fill fields the user left empty; never overwrite what was typed.
fn autofill(draft: &mut EntryDraft, found: DictionaryEntry) {
    if draft.definition_english.trim().is_empty() {
        draft.definition_english = found.definition;
    }
    if draft.phonetic.trim().is_empty() {
        draft.phonetic = found.phonetic;
    }
    if draft.audio_url_uk.is_empty() {
        draft.audio_url_uk = found.audio_url_uk;
    }
    if draft.audio_url_us.is_empty() {
        draft.audio_url_us = found.audio_url_us;
    }
    if draft.audio_url.is_empty() {
        draft.audio_url = if draft.audio_url_us.is_empty() {
            draft.audio_url_uk.clone()
        } else {
            draft.audio_url_us.clone()
        };
    }
    if draft.examples_original.iter().all(|e| e.trim().is_empty()) {
        for example in found.examples {
            *draft = std::mem::take(draft).with_example(example);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autofill_keeps_user_input() {
        let mut draft = EntryDraft::new("implement", PartOfSpeech::Verb)
            .with_definitions("實施", "to carry out");
        autofill(
            &mut draft,
            DictionaryEntry {
                phonetic: "/ˈɪmplɪmɛnt/".into(),
                definition: "To bring about.".into(),
                examples: vec!["We implemented it.".into()],
                audio_url_uk: "uk.mp3".into(),
                audio_url_us: "us.mp3".into(),
            },
        );
        assert_eq!(draft.definition_english, "to carry out");
        assert_eq!(draft.phonetic, "/ˈɪmplɪmɛnt/");
        assert_eq!(draft.audio_url, "us.mp3");
        assert_eq!(draft.examples_original, vec!["We implemented it."]);
    }

    #[test]
    fn fields_apply_over_draft() {
        let fields = EntryFields {
            zh: Some("實施".into()),
            examples: vec!["a".into(), "b".into()],
            tags: vec!["work".into(), "work".into()],
            source: Some("meeting".into()),
            ..EntryFields::default()
        };
        let draft = fields.apply(EntryDraft::new("implement", PartOfSpeech::Verb));
        assert_eq!(draft.definition_chinese, "實施");
        assert_eq!(draft.examples_original, vec!["a", "b"]);
        assert_eq!(draft.tags, vec!["work"]);
        assert_eq!(draft.context.source, "meeting");
    }
}
