//! The `wordbank show` command.

use std::io::IsTerminal;

use anyhow::Result;
use chrono::Local;

use wordbank_core::markup::{parse_markup, strip_markup, Segment};
use wordbank_core::model::Entry;

use super::{find_entry, Globals};

pub async fn execute(globals: &Globals, id: String) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    let entry = find_entry(&repository, &id).await?;
    print!("{}", render(&entry, std::io::stdout().is_terminal()));
    Ok(())
}

/// Bold markup becomes ANSI bold on a terminal and is stripped otherwise.
fn render_markup(text: &str, ansi: bool) -> String {
    if !ansi {
        return strip_markup(text);
    }
    parse_markup(text)
        .iter()
        .map(|segment| match segment {
            Segment::Plain(t) => t.to_string(),
            Segment::Bold(t) => format!("\x1b[1m{t}\x1b[0m"),
        })
        .collect()
}

fn render(entry: &Entry, ansi: bool) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            out.push_str(&format!("{label:<12} {value}\n"));
        }
    };

    line("Word", &format!("{} ({})", entry.word, entry.part_of_speech));
    line("ID", &entry.id);
    line(
        "Added",
        &entry
            .added_date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    );
    line("Phonetic", &entry.pronunciation.phonetic);
    line("Audio", &entry.pronunciation.audio_url);
    line("Chinese", &entry.definitions.chinese);
    line("English", &entry.definitions.english);
    for example in &entry.examples.original {
        line("Example", &render_markup(example, ansi));
    }
    line("My example", &entry.examples.my_own);
    line("Corrected", &entry.examples.ai_corrected);
    line("Suggestion", &entry.examples.ai_suggestion);
    line("Source", &entry.context.source);
    line("Scenario", &entry.context.scenario);
    line("URL", &entry.context.url);
    line("Tags", &entry.tags.join(", "));

    match &entry.practice_stats {
        Some(stats) if stats.total_practices > 0 => {
            let recent = stats
                .recent_scores
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            line(
                "Level",
                &format!(
                    "{} {}",
                    stats.proficiency_level,
                    "*".repeat(stats.proficiency_level.stars().into())
                ),
            );
            line("Practiced", &stats.total_practices.to_string());
            line(
                "Average",
                &stats
                    .average_score
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            );
            line("Recent", &recent);
            for error in &stats.common_errors {
                line(
                    "Mistake",
                    &format!("[{}] {} (x{})", error.kind, error.pattern, error.count),
                );
            }
        }
        _ => line("Level", "not practiced yet"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_stripped_off_terminal() {
        assert_eq!(
            render_markup("We **implemented** it.", false),
            "We implemented it."
        );
        assert_eq!(
            render_markup("We **implemented** it.", true),
            "We \x1b[1mimplemented\x1b[0m it."
        );
    }
}
