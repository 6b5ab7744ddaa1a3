//! The `wordbank practice` command.

use std::sync::Arc;

use anyhow::{bail, Result};

use wordbank_core::error::PracticeError;
use wordbank_core::model::Entry;
use wordbank_core::session::PracticeSession;
use wordbank_core::traits::GradingFeedback;

use super::{find_entry, Globals};

pub async fn execute(
    globals: &Globals,
    id: String,
    sentence: Option<String>,
    model: Option<String>,
    add_to_examples: bool,
    scenario: bool,
) -> Result<()> {
    let (config, repository) = globals.open_repository().await?;
    let entry = find_entry(&repository, &id).await?;
    let grader = Arc::new(config.build_grader()?);

    let mut session = PracticeSession::new(repository, grader, config.practice, entry);
    if let Some(model) = model {
        session = session.with_model(model);
    }

    if scenario {
        let prompt = session.next_scenario();
        println!("Scenario ({}): {}", prompt.category, prompt.prompt);
    }

    let Some(sentence) = sentence else {
        if scenario {
            return Ok(());
        }
        bail!("write a sentence with --sentence");
    };

    let feedback = session.submit(&sentence).await?;
    print_feedback(&feedback);

    if add_to_examples {
        match session.add_to_examples().await {
            Ok(_) => println!("\nAdded the improved sentence to the examples."),
            Err(PracticeError::ScoreTooLow { score, threshold }) => println!(
                "\nNot added to examples: score {score} is below {threshold}."
            ),
            Err(e) => return Err(e.into()),
        }
    }

    print_progress(session.entry());
    Ok(())
}

fn print_feedback(feedback: &GradingFeedback) {
    let verdict = if feedback.is_correct {
        "correct"
    } else {
        "needs work"
    };
    println!("Score: {}/100 ({verdict})", feedback.score);

    if !feedback.errors.is_empty() {
        println!("\nMistakes:");
        for error in &feedback.errors {
            println!("  [{}] {} -> {}", error.kind, error.original, error.correction);
            if !error.explanation.is_empty() {
                println!("      {}", error.explanation);
            }
        }
    }
    if !feedback.improved_version.is_empty() {
        println!("\nImproved: {}", feedback.improved_version);
    }
    if !feedback.suggestions.is_empty() {
        println!("\nSuggestions:");
        for suggestion in &feedback.suggestions {
            println!("  - {suggestion}");
        }
    }
    if !feedback.overall_comment.is_empty() {
        println!("\n{}", feedback.overall_comment);
    }
}

fn print_progress(entry: &Entry) {
    if let Some(stats) = &entry.practice_stats {
        let average = stats
            .average_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "\n{}: {} after {} practice(s), average {}",
            entry.word, stats.proficiency_level, stats.total_practices, average
        );
    }
}
