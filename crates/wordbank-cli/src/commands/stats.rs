//! The `wordbank stats` command.

use anyhow::Result;
use chrono::Local;
use comfy_table::{Cell, Table};

use wordbank_core::filter::compute_stats;
use wordbank_core::model::PartOfSpeech;
use wordbank_core::statistics::proficiency_breakdown;

use super::Globals;

pub async fn execute(globals: &Globals) -> Result<()> {
    let (_, repository) = globals.open_repository().await?;
    let entries = repository.load_all().await;
    let stats = compute_stats(&entries, &Local::now());

    let mut table = Table::new();
    table.set_header(vec!["", "Entries"]);
    for (label, count) in [
        ("Total", stats.total),
        ("Added today", stats.today),
        ("Added this week", stats.week),
        ("Practiced", stats.practiced),
        ("Not practiced", stats.unpracticed),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("{table}");

    let mut by_pos = Table::new();
    by_pos.set_header(vec!["Part of speech", "Entries"]);
    for pos in PartOfSpeech::ALL {
        let count = entries.iter().filter(|e| e.part_of_speech == pos).count();
        if count > 0 {
            by_pos.add_row(vec![Cell::new(pos), Cell::new(count)]);
        }
    }
    println!("{by_pos}");

    let breakdown = proficiency_breakdown(&entries);
    if !breakdown.is_empty() {
        let mut levels = Table::new();
        levels.set_header(vec!["Level", "Entries"]);
        for (level, count) in &breakdown {
            levels.add_row(vec![
                Cell::new(format!("{level} {}", "*".repeat(level.stars().into()))),
                Cell::new(count),
            ]);
        }
        println!("{levels}");
    }
    Ok(())
}
