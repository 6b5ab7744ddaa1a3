//! Practice statistics aggregation.
//!
//! Folds one graded attempt into an entry's [`PracticeStats`]: sliding score
//! window, rounded average, attempt counter, proficiency tier and the
//! most-frequent error patterns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Entry, ErrorPattern, PracticeStats, ProficiencyLevel};
use crate::traits::{GradingFeedback, SentenceError};

/// Number of recent scores kept per entry.
pub const DEFAULT_SCORE_WINDOW: usize = 3;
/// Number of error patterns kept per entry.
pub const DEFAULT_MAX_ERROR_PATTERNS: usize = 5;
/// Minimum score for an improved sentence to be saved as an example.
pub const DEFAULT_ADD_EXAMPLE_THRESHOLD: u8 = 70;

/// Tunable limits for practice statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeLimits {
    #[serde(default = "default_score_window")]
    pub score_window: usize,
    #[serde(default = "default_max_error_patterns")]
    pub max_error_patterns: usize,
    #[serde(default = "default_add_example_threshold")]
    pub add_example_threshold: u8,
}

fn default_score_window() -> usize {
    DEFAULT_SCORE_WINDOW
}
fn default_max_error_patterns() -> usize {
    DEFAULT_MAX_ERROR_PATTERNS
}
fn default_add_example_threshold() -> u8 {
    DEFAULT_ADD_EXAMPLE_THRESHOLD
}

impl Default for PracticeLimits {
    fn default() -> Self {
        Self {
            score_window: DEFAULT_SCORE_WINDOW,
            max_error_patterns: DEFAULT_MAX_ERROR_PATTERNS,
            add_example_threshold: DEFAULT_ADD_EXAMPLE_THRESHOLD,
        }
    }
}

/// Append `score` and keep only the last `window` scores.
pub fn push_score(recent: &[u8], score: u8, window: usize) -> Vec<u8> {
    let window = window.max(1);
    let mut scores: Vec<u8> = recent.to_vec();
    scores.push(score);
    if scores.len() > window {
        scores.drain(..scores.len() - window);
    }
    scores
}

/// Arithmetic mean, `None` for no scores.
pub fn mean_score(scores: &[u8]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: u32 = scores.iter().map(|&s| s as u32).sum();
    Some(sum as f64 / scores.len() as f64)
}

/// Mean rounded half-up to an integer score.
pub fn average_score(scores: &[u8]) -> Option<u8> {
    mean_score(scores).map(|m| m.round().clamp(0.0, 100.0) as u8)
}

/// Proficiency tier from recent scores and the total attempt count.
///
/// Evaluated top-down, first match wins:
///
/// | mean | attempts | level        |
/// |------|----------|--------------|
/// | ≥ 90 | ≥ 5      | mastered     |
/// | ≥ 80 | ≥ 3      | advanced     |
/// | ≥ 60 | ≥ 2      | intermediate |
/// | else |          | beginner     |
pub fn proficiency_level(recent_scores: &[u8], total_practices: u32) -> ProficiencyLevel {
    if total_practices == 0 {
        return ProficiencyLevel::Beginner;
    }
    let Some(mean) = mean_score(recent_scores) else {
        return ProficiencyLevel::Beginner;
    };

    if mean >= 90.0 && total_practices >= 5 {
        ProficiencyLevel::Mastered
    } else if mean >= 80.0 && total_practices >= 3 {
        ProficiencyLevel::Advanced
    } else if mean >= 60.0 && total_practices >= 2 {
        ProficiencyLevel::Intermediate
    } else {
        ProficiencyLevel::Beginner
    }
}

/// Merge newly reported errors into the known patterns.
///
/// Errors are matched on their exact `pattern` text; errors with an empty
/// pattern are ignored. The result is sorted by count (descending, stable, so ties
/// keep their earlier order) and cut to `max_patterns`.
pub fn merge_error_patterns(
    existing: &[ErrorPattern],
    new_errors: &[SentenceError],
    max_patterns: usize,
) -> Vec<ErrorPattern> {
    let mut merged: Vec<ErrorPattern> = existing.to_vec();

    for error in new_errors {
        if error.pattern.is_empty() {
            continue;
        }
        match merged.iter_mut().find(|p| p.pattern == error.pattern) {
            Some(known) => known.count += 1,
            None => merged.push(ErrorPattern {
                kind: error.kind,
                pattern: error.pattern.clone(),
                count: 1,
            }),
        }
    }

    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged.truncate(max_patterns);
    merged
}

/// Fold one graded attempt into the previous stats (or fresh stats).
pub fn record_attempt(
    previous: Option<&PracticeStats>,
    feedback: &GradingFeedback,
    now: DateTime<Utc>,
    limits: &PracticeLimits,
) -> PracticeStats {
    let previous = previous.cloned().unwrap_or_default();

    let recent_scores = push_score(&previous.recent_scores, feedback.score, limits.score_window);
    let total_practices = previous.total_practices.saturating_add(1);

    PracticeStats {
        total_practices,
        last_practice_date: Some(now),
        proficiency_level: proficiency_level(&recent_scores, total_practices),
        common_errors: merge_error_patterns(
            &previous.common_errors,
            &feedback.errors,
            limits.max_error_patterns,
        ),
        average_score: average_score(&recent_scores),
        recent_scores,
    }
}

/// How many entries sit at each proficiency level. Unpracticed entries are
/// not counted.
pub fn proficiency_breakdown(entries: &[Entry]) -> BTreeMap<ProficiencyLevel, usize> {
    let mut breakdown = BTreeMap::new();
    for stats in entries.iter().filter_map(|e| e.practice_stats.as_ref()) {
        if stats.total_practices > 0 {
            *breakdown.entry(stats.proficiency_level).or_insert(0) += 1;
        }
    }
    breakdown
}
