//! Practice session for a single entry.
//!
//! The learner writes a sentence with the target word, the grading oracle
//! scores it, and the result is folded into the entry's practice stats.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Feedback ──continue/clear/add──▶ Idle
//!                       └──err──▶ Failed ──submit/clear──▶ …
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::PracticeError;
use crate::model::Entry;
use crate::repository::WordRepository;
use crate::scenarios::{random_scenario, Scenario};
use crate::statistics::{record_attempt, PracticeLimits};
use crate::traits::{GradeRequest, GradingFeedback, GradingOracle};

/// Where a practice session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    /// Waiting on the grading oracle.
    Submitting,
    Feedback(GradingFeedback),
    /// The last submission failed; the message is user-facing.
    Failed(String),
}

pub struct PracticeSession {
    repository: WordRepository,
    grader: Arc<dyn GradingOracle>,
    limits: PracticeLimits,
    entry: Entry,
    model: Option<String>,
    sentence: String,
    state: SessionState,
    scenario: Option<&'static Scenario>,
}

impl PracticeSession {
    pub fn new(
        repository: WordRepository,
        grader: Arc<dyn GradingOracle>,
        limits: PracticeLimits,
        entry: Entry,
    ) -> Self {
        Self {
            repository,
            grader,
            limits,
            entry,
            model: None,
            sentence: String::new(),
            state: SessionState::Idle,
            scenario: None,
        }
    }

    /// Grade with a specific model alias instead of the oracle default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The entry as last persisted by this session.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The sentence of the current or last submission.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn feedback(&self) -> Option<&GradingFeedback> {
        match &self.state {
            SessionState::Feedback(feedback) => Some(feedback),
            _ => None,
        }
    }

    /// Grade `sentence` and record the attempt.
    ///
    /// Blank sentences are rejected without calling the oracle. On oracle
    /// failure the stats are left untouched and the session moves to
    /// [`SessionState::Failed`].
    pub async fn submit(&mut self, sentence: &str) -> Result<GradingFeedback, PracticeError> {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            return Err(PracticeError::Validation(
                "please write a sentence using the word".into(),
            ));
        }
        if self.state == SessionState::Submitting {
            return Err(PracticeError::Busy);
        }

        self.sentence = sentence.to_string();
        self.state = SessionState::Submitting;

        let request = GradeRequest {
            word: self.entry.word.clone(),
            part_of_speech: self.entry.part_of_speech,
            sentence: self.sentence.clone(),
            model: self.model.clone(),
        };

        let feedback = match self.grader.grade(&request).await {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!(
                    oracle = self.grader.name(),
                    word = %self.entry.word,
                    error = %e,
                    "grading failed"
                );
                self.state = SessionState::Failed(e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.record(&feedback).await {
            self.state = SessionState::Failed(e.to_string());
            return Err(e);
        }

        let level = self
            .entry
            .practice_stats
            .as_ref()
            .map(|s| s.proficiency_level)
            .unwrap_or_default();
        info!(
            word = %self.entry.word,
            score = feedback.score,
            level = %level,
            "practice graded"
        );
        self.state = SessionState::Feedback(feedback.clone());
        Ok(feedback)
    }

    /// Fold feedback into the latest persisted copy of the entry.
    async fn record(&mut self, feedback: &GradingFeedback) -> Result<(), PracticeError> {
        let mut latest = self.latest_entry().await?;
        latest.practice_stats = Some(record_attempt(
            latest.practice_stats.as_ref(),
            feedback,
            Utc::now(),
            &self.limits,
        ));
        self.repository.update(&latest).await?;
        self.entry = latest;
        Ok(())
    }

    /// Persisted entry, or the session's copy if it was deleted meanwhile
    /// (saving it recreates the entry).
    async fn latest_entry(&self) -> Result<Entry, PracticeError> {
        match self.repository.get(&self.entry.id).await? {
            Some(entry) => Ok(entry),
            None => {
                warn!(id = %self.entry.id, "entry vanished during practice, recreating it");
                Ok(self.entry.clone())
            }
        }
    }

    /// Back to idle for another attempt.
    pub fn continue_practice(&mut self) {
        self.reset();
    }

    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.sentence.clear();
        self.state = SessionState::Idle;
    }

    /// Save the improved sentence from the last feedback as a reference
    /// example. Requires a score of at least the configured threshold.
    pub async fn add_to_examples(&mut self) -> Result<&Entry, PracticeError> {
        let SessionState::Feedback(feedback) = &self.state else {
            return Err(PracticeError::NoFeedback);
        };
        let improved = feedback.improved_version.trim().to_string();
        if improved.is_empty() {
            return Err(PracticeError::Validation(
                "the feedback has no improved sentence".into(),
            ));
        }
        let threshold = self.limits.add_example_threshold;
        if feedback.score < threshold {
            return Err(PracticeError::ScoreTooLow {
                score: feedback.score,
                threshold,
            });
        }

        let mut latest = self.latest_entry().await?;
        latest.examples.original.push(improved);
        self.repository.update(&latest).await?;
        info!(word = %latest.word, "added improved sentence to examples");

        self.entry = latest;
        self.reset();
        Ok(&self.entry)
    }

    /// A writing prompt for this entry, different from the current one when
    /// possible.
    pub fn next_scenario(&mut self) -> &'static Scenario {
        let exclude = self.scenario.map(|s| s.id);
        let scenario = random_scenario(self.entry.part_of_speech, exclude);
        self.scenario = Some(scenario);
        scenario
    }

    pub fn scenario(&self) -> Option<&'static Scenario> {
        self.scenario
    }
}
