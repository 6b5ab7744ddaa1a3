//! The `wordbank edit` command.

use anyhow::Result;

use wordbank_core::model::{EntryDraft, PartOfSpeech};

use super::add::EntryFields;
use super::{find_entry, Globals};

pub async fn execute(
    globals: &Globals,
    id: String,
    word: Option<String>,
    pos: Option<PartOfSpeech>,
    untag: Vec<String>,
    fields: EntryFields,
) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    let existing = find_entry(&repository, &id).await?;

    let mut draft = EntryDraft::from_entry(&existing);
    if let Some(word) = word {
        draft.word = word;
    }
    if let Some(pos) = pos {
        draft.part_of_speech = pos;
    }
    for tag in &untag {
        draft.remove_tag(tag.trim());
    }
    let draft = fields.apply(draft);

    let entry = repository.save(&draft, Some(&existing)).await?;
    println!("Updated {} ({})", entry.word, entry.id);
    Ok(())
}
