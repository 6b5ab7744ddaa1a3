//! The `wordbank lookup` command.

use anyhow::Result;

use wordbank_core::model::PartOfSpeech;
use wordbank_core::traits::LookupOracle;

use super::Globals;

pub async fn execute(globals: &Globals, word: String, pos: PartOfSpeech) -> Result<()> {
    let config = globals.load_config()?;
    let dictionary = config.build_dictionary()?;
    let found = dictionary.lookup(&word, pos).await?;

    println!("{} ({pos})", word.trim());
    if !found.phonetic.is_empty() {
        println!("  {}", found.phonetic);
    }
    println!("  {}", found.definition);
    for example in &found.examples {
        println!("  e.g. {example}");
    }
    for (accent, url) in [("UK", &found.audio_url_uk), ("US", &found.audio_url_us)] {
        if !url.is_empty() {
            println!("  audio {accent}: {url}");
        }
    }
    Ok(())
}
