//! The `wordbank list` command.

use anyhow::Result;
use chrono::Local;
use clap::Args;
use comfy_table::{Cell, Table};

use wordbank_core::filter::{self, CollectionStats, DateWindow, Filters, PracticeStatus, SortKey};
use wordbank_core::model::{Entry, PartOfSpeech};

use super::Globals;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive search over word and definitions
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub pos: Option<PartOfSpeech>,

    #[arg(long)]
    pub tag: Option<String>,

    /// today, week, month or all
    #[arg(long, default_value_t = DateWindow::Week)]
    pub date: DateWindow,

    /// all, practiced or unpracticed
    #[arg(long, default_value = "all")]
    pub status: PracticeStatus,

    /// newest, oldest or alphabetical
    #[arg(long, default_value_t = SortKey::Newest)]
    pub sort: SortKey,
}

pub async fn execute(globals: &Globals, args: ListArgs) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    let entries = repository.load_all().await;

    let filters = Filters {
        search: args.search,
        part_of_speech: args.pos,
        tag: args.tag,
        date: args.date,
        status: args.status,
    };
    let view = filter::apply(&entries, &filters, args.sort, &Local::now());

    if view.entries.is_empty() {
        println!("No entries match the current filters.");
    } else {
        println!("{}", entry_table(&view.entries));
    }
    println!("{}", stats_line(&view.stats));
    if !view.all_tags.is_empty() {
        println!("Tags: {}", view.all_tags.join(", "));
    }
    Ok(())
}

fn entry_table(entries: &[&Entry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Word", "POS", "Definition", "Tags", "Level", "Added"]);

    for entry in entries {
        let definition = [&entry.definitions.chinese, &entry.definitions.english]
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(" / ");
        let level = entry
            .practice_stats
            .as_ref()
            .map(|s| format!("{} ({})", s.proficiency_level, s.total_practices))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(&entry.word),
            Cell::new(entry.part_of_speech.abbreviation()),
            Cell::new(definition),
            Cell::new(entry.tags.join(", ")),
            Cell::new(level),
            Cell::new(
                entry
                    .added_date
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
            ),
        ]);
    }
    table
}

pub fn stats_line(stats: &CollectionStats) -> String {
    format!(
        "Showing {} of {} | today {} | this week {} | practiced {} | unpracticed {}",
        stats.filtered, stats.total, stats.today, stats.week, stats.practiced, stats.unpracticed
    )
}
