//! Writing-assistant commands: `spell-check`, `translate` and `correct`.

use anyhow::Result;

use wordbank_core::model::PartOfSpeech;
use wordbank_core::traits::LanguageAssistant;

use super::Globals;

pub async fn spell_check(globals: &Globals, word: String) -> Result<()> {
    let assistant = globals.load_config()?.build_assistant()?;
    let check = assistant.spell_check(&word).await?;

    if check.is_correct {
        println!("'{}' is spelled correctly.", word.trim());
    } else if check.is_correctable {
        println!("'{}' may be misspelled.", word.trim());
    } else {
        println!("Could not check '{}'.", word.trim());
    }
    if !check.message.is_empty() {
        println!("{}", check.message);
    }
    for suggestion in &check.suggestions {
        println!("  - {suggestion}");
    }
    Ok(())
}

pub async fn translate(globals: &Globals, text: String) -> Result<()> {
    let assistant = globals.load_config()?.build_assistant()?;
    println!("{}", assistant.translate(&text).await?);
    Ok(())
}

pub async fn correct(
    globals: &Globals,
    word: String,
    pos: PartOfSpeech,
    sentence: String,
) -> Result<()> {
    let assistant = globals.load_config()?.build_assistant()?;
    let correction = assistant.correct_example(&word, pos, &sentence).await?;

    println!("{}", correction.corrected);
    if !correction.contains_target {
        println!("The correction no longer uses '{}'.", word.trim());
        if let Some(suggestion) = &correction.suggestion {
            println!("Try: {suggestion}");
        }
    }
    Ok(())
}
